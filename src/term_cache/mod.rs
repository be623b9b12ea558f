//! Persistent, day-stamped pool of search terms backed by SQLite.
//!
//! The pool is a single key/value table. Term rows map a lower-cased term to
//! its shuffle position and a `used` flag; one reserved row keyed
//! [`LOAD_DATE_KEY`] holds the date the pool was filled. A pool whose date is
//! missing or older than today is replaced wholesale before any term is read.
//!
//! Refreshes fetch first and swap inside one transaction, so a failed fetch
//! leaves yesterday's pool exactly as it was.
//!
//! Root terms are handed out round-robin without replacement in the persisted
//! shuffle order: each pick takes the lowest-position unused term and marks it
//! used; once every term is used the flags reset and rotation restarts.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use rand::seq::SliceRandom;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{Result, RewardsError};
use crate::utils::constants::LOAD_DATE_KEY;

/// SQL schema for the term pool
const SCHEMA_SQL: &str = r#"
-- Terms keyed by text; the load date sentinel lives in the same table
CREATE TABLE IF NOT EXISTS term_pool (
    key TEXT PRIMARY KEY,
    value TEXT,
    position INTEGER NOT NULL DEFAULT 0,
    used INTEGER NOT NULL DEFAULT 0
);

-- Rotation walks terms in shuffle order
CREATE INDEX IF NOT EXISTS idx_term_pool_position ON term_pool(position);
"#;

const INSERT_TERM: &str =
    "INSERT OR IGNORE INTO term_pool (key, value, position, used) VALUES (?, NULL, ?, 0)";

const NEXT_UNUSED: &str =
    "SELECT key FROM term_pool WHERE key != ? AND used = 0 ORDER BY position LIMIT 1";

const MARK_USED: &str = "UPDATE term_pool SET used = 1 WHERE key = ?";

/// Position stored on the sentinel row, below every term
const SENTINEL_POSITION: i64 = -1;

/// Day-stamped term pool persisted across runs
#[derive(Debug, Clone)]
pub struct TermCache {
    pool: SqlitePool,
    path: PathBuf,
}

impl TermCache {
    /// Open the pool at `path`, creating the file and its parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] if the store cannot be opened or initialized.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RewardsError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        // Single writer: one connection keeps every statement strictly ordered
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                RewardsError::Storage(format!("failed to open {}: {e}", path.display()))
            })?;

        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        debug!("Opened term pool at {}", path.display());
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Date the pool was last filled, `None` for a pool never filled
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] on a read failure or a corrupt sentinel.
    pub async fn load_date(&self) -> Result<Option<NaiveDate>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT value FROM term_pool WHERE key = ?")
                .bind(LOAD_DATE_KEY)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((Some(value),)) => value.parse::<NaiveDate>().map(Some).map_err(|e| {
                RewardsError::Storage(format!("corrupt {LOAD_DATE_KEY} value '{value}': {e}"))
            }),
            _ => Ok(None),
        }
    }

    /// Refill the pool through `fetch` unless it was already filled today
    ///
    /// Returns whether a refresh happened.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error untouched (the pool keeps its prior state) and
    /// returns [`RewardsError::Storage`] on store failures.
    pub async fn ensure_fresh<F, Fut>(&self, fetch: F, desired_count: usize) -> Result<bool>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        self.ensure_fresh_on(Local::now().date_naive(), fetch, desired_count)
            .await
    }

    /// [`Self::ensure_fresh`] with an explicit "today"
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_fresh`].
    pub async fn ensure_fresh_on<F, Fut>(
        &self,
        today: NaiveDate,
        fetch: F,
        desired_count: usize,
    ) -> Result<bool>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        match self.load_date().await? {
            Some(loaded) if loaded >= today => {
                debug!("Term pool loaded on {}, still fresh", loaded);
                Ok(false)
            }
            loaded => {
                info!(
                    "Term pool stale (loaded {:?}, today {}), refreshing",
                    loaded, today
                );
                self.refresh_on(today, fetch, desired_count).await?;
                Ok(true)
            }
        }
    }

    /// Replace the pool regardless of its load date
    ///
    /// # Errors
    ///
    /// See [`Self::ensure_fresh`].
    pub async fn force_refresh<F, Fut>(&self, fetch: F, desired_count: usize) -> Result<()>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        self.refresh_on(Local::now().date_naive(), fetch, desired_count)
            .await
    }

    async fn refresh_on<F, Fut>(
        &self,
        today: NaiveDate,
        fetch: F,
        desired_count: usize,
    ) -> Result<()>
    where
        F: FnOnce(usize) -> Fut,
        Fut: Future<Output = Result<Vec<String>>>,
    {
        // Fetch before touching the store: a failed fetch must not clear anything
        let mut terms = fetch(desired_count).await?;
        terms.shuffle(&mut rand::rng());

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM term_pool").execute(&mut *tx).await?;

        let mut inserted = 0_u64;
        for (position, term) in terms.iter().enumerate() {
            if term == LOAD_DATE_KEY {
                continue;
            }
            let result = sqlx::query(INSERT_TERM)
                .bind(term)
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
            inserted += result.rows_affected();
        }

        sqlx::query("INSERT INTO term_pool (key, value, position, used) VALUES (?, ?, ?, 0)")
            .bind(LOAD_DATE_KEY)
            .bind(today.to_string())
            .bind(SENTINEL_POSITION)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!("Term pool refreshed with {} terms for {}", inserted, today);
        Ok(())
    }

    /// Next root term in rotation, marked used
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::EmptyPool`] when the pool holds no terms and
    /// [`RewardsError::Storage`] on store failures.
    pub async fn pick_root_term(&self) -> Result<String> {
        let mut tx = self.pool.begin().await?;
        let term = next_in_rotation(&mut tx).await?;
        set_used(&mut tx, &term).await?;
        tx.commit().await?;

        debug!("rootTerm={}", term);
        Ok(term)
    }

    /// Next root term in rotation, left unused until [`Self::mark_used`]
    ///
    /// Lets a caller consume the term only once it has been put to use.
    ///
    /// # Errors
    ///
    /// See [`Self::pick_root_term`].
    pub async fn peek_root_term(&self) -> Result<String> {
        let mut tx = self.pool.begin().await?;
        let term = next_in_rotation(&mut tx).await?;
        tx.commit().await?;
        Ok(term)
    }

    /// Take `term` out of the current rotation
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] on a write failure.
    pub async fn mark_used(&self, term: &str) -> Result<()> {
        sqlx::query(MARK_USED).bind(term).execute(&self.pool).await?;

        debug!("rootTerm={}", term);
        Ok(())
    }

    /// All terms in rotation order, sentinel excluded
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] on a read failure.
    pub async fn terms(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM term_pool WHERE key != ? ORDER BY position")
                .bind(LOAD_DATE_KEY)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(term,)| term).collect())
    }

    /// Number of terms, sentinel excluded
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] on a read failure.
    pub async fn len(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM term_pool WHERE key != ?")
            .bind(LOAD_DATE_KEY)
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// # Errors
    ///
    /// Returns [`RewardsError::Storage`] on a read failure.
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Release the store; pending writes are flushed
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Closed term pool at {}", self.path.display());
    }
}

/// Lowest-position unused term; restarts the rotation once every term is used
async fn next_in_rotation(tx: &mut Transaction<'_, Sqlite>) -> Result<String> {
    let next: Option<(String,)> = sqlx::query_as(NEXT_UNUSED)
        .bind(LOAD_DATE_KEY)
        .fetch_optional(&mut **tx)
        .await?;

    if let Some((term,)) = next {
        return Ok(term);
    }

    let reset = sqlx::query("UPDATE term_pool SET used = 0 WHERE key != ?")
        .bind(LOAD_DATE_KEY)
        .execute(&mut **tx)
        .await?;
    if reset.rows_affected() == 0 {
        return Err(RewardsError::EmptyPool);
    }
    debug!("Every term used once, restarting rotation");

    let (term,): (String,) = sqlx::query_as(NEXT_UNUSED)
        .bind(LOAD_DATE_KEY)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(RewardsError::EmptyPool)?;
    Ok(term)
}

async fn set_used(tx: &mut Transaction<'_, Sqlite>, term: &str) -> Result<()> {
    sqlx::query(MARK_USED).bind(term).execute(&mut **tx).await?;
    Ok(())
}
