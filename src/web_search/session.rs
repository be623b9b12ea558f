//! One logical search, and batches of them
//!
//! A logical search takes the next root term from the pool, expands it into a
//! [`TermCycle`] of related phrasings, and lets the [`RetryExecutor`] submit
//! one phrasing per attempt until the points counter moves.

use tracing::{debug, info, warn};

use super::types::{BatchReport, SearchDriver, TermCycle};
use crate::error::{Result, RewardsError};
use crate::retry::{PauseRange, RetryAction, RetryExecutor, RetryOutcome, SuccessSignal};
use crate::term_cache::TermCache;
use crate::term_source::RelatedTermProvider;

/// Orchestrates term selection, expansion, and retried submission
pub struct SearchSession<'a, P, D, S> {
    cache: &'a TermCache,
    provider: &'a P,
    driver: D,
    signal: S,
    executor: RetryExecutor,
    between_searches: PauseRange,
}

impl<'a, P, D, S> SearchSession<'a, P, D, S>
where
    P: RelatedTermProvider,
    D: SearchDriver,
    S: SuccessSignal,
{
    #[must_use]
    pub fn new(
        cache: &'a TermCache,
        provider: &'a P,
        driver: D,
        signal: S,
        executor: RetryExecutor,
    ) -> Self {
        Self {
            cache,
            provider,
            driver,
            signal,
            executor,
            between_searches: PauseRange::none(),
        }
    }

    /// Pause drawn from `range` after every search of a batch
    #[must_use]
    pub fn with_between_searches_pause(mut self, range: PauseRange) -> Self {
        self.between_searches = range;
        self
    }

    /// Perform one logical search
    ///
    /// # Errors
    ///
    /// Returns fatal errors from the pool, the provider, the driver, or the
    /// signal. Exhaustion is reported as [`RetryOutcome::Exhausted`].
    pub async fn search_once(&mut self) -> Result<RetryOutcome> {
        // The root term leaves the rotation only once it has been expanded
        let root_term = self.cache.peek_root_term().await?;
        let related = self.provider.fetch_related_terms(&root_term).await?;
        self.cache.mark_used(&root_term).await?;
        debug!("terms={:?}", related);

        let terms = TermCycle::new(related).ok_or_else(|| {
            RewardsError::Fetch(format!("no phrasings available for '{root_term}'"))
        })?;

        let mut attempt = SearchAttempt {
            driver: &mut self.driver,
            terms,
        };
        self.executor.run(&mut attempt, &mut self.signal).await
    }

    /// Perform `total_searches` logical searches, pausing after each one
    ///
    /// Exhausted searches are tallied and the batch carries on.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error from [`Self::search_once`].
    pub async fn run_batch(&mut self, total_searches: u32) -> Result<BatchReport> {
        let mut report = BatchReport {
            total: total_searches,
            ..BatchReport::default()
        };

        info!("[BING] Starting {} searches...", total_searches);

        for count in 1..=total_searches {
            info!("[BING] {}/{}", count, total_searches);

            match self.search_once().await? {
                RetryOutcome::Succeeded { .. } => report.succeeded += 1,
                RetryOutcome::Exhausted { attempts } => {
                    warn!(
                        "[BING] Search {}/{} not credited after {} attempts",
                        count,
                        total_searches,
                        attempts
                    );
                    report.exhausted += 1;
                }
            }

            let pause = self.between_searches.sample();
            if !pause.is_zero() {
                debug!("Sleeping {}s before next search", pause.as_secs());
                tokio::time::sleep(pause).await;
            }
        }

        info!(
            "[BING] Finished searches: {} credited, {} exhausted",
            report.succeeded,
            report.exhausted
        );
        Ok(report)
    }

    /// Hand back the driver and signal, e.g. to inspect or shut them down
    pub fn into_parts(self) -> (D, S) {
        (self.driver, self.signal)
    }
}

/// Submits the next phrasing of the cycle on every attempt
struct SearchAttempt<'d, D> {
    driver: &'d mut D,
    terms: TermCycle,
}

impl<D: SearchDriver> RetryAction for SearchAttempt<'_, D> {
    async fn run(&mut self, attempt: u32) -> Result<()> {
        let term = self.terms.next_term().to_string();
        debug!("attempt={} term={}", attempt, term);
        self.driver.submit_search(&term).await
    }
}
