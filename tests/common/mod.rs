//! Test utilities and fakes shared by the rewards search test suite

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Result;
use mockito::{Matcher, Mock, ServerGuard};
use rewards_search::{
    RelatedTermProvider, RetryAction, RewardsError, SearchDriver, SuccessSignal, TermCache,
};
use tempfile::TempDir;

/// Creates a temporary directory for test output
#[allow(dead_code)]
pub fn create_test_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Opens a fresh term pool inside `dir`
#[allow(dead_code)]
pub async fn open_test_cache(dir: &TempDir) -> TermCache {
    TermCache::open(&pool_path(dir)).await.unwrap()
}

#[allow(dead_code)]
pub fn pool_path(dir: &TempDir) -> PathBuf {
    dir.path().join("state").join("google_trends.sqlite")
}

/// `count` distinct lower-case terms
#[allow(dead_code)]
pub fn sample_terms(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("term {i}")).collect()
}

/// Builds a daily trends body (with the anti-hijacking prefix)
#[allow(dead_code)]
pub fn trends_body(entries: &[(&str, &[&str])]) -> String {
    let searches: Vec<serde_json::Value> = entries
        .iter()
        .map(|(title, related)| {
            serde_json::json!({
                "title": { "query": title },
                "relatedQueries": related
                    .iter()
                    .map(|q| serde_json::json!({ "query": q }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let body = serde_json::json!({
        "default": { "trendingSearchesDays": [ { "trendingSearches": searches } ] }
    });
    format!(")]}}',\n{body}")
}

/// Creates a daily trends mock answering only for day `ed` (YYYYMMDD)
#[allow(dead_code)]
pub async fn create_trends_mock(server: &mut ServerGuard, ed: &str, body: &str) -> Mock {
    server
        .mock("GET", "/trends/api/dailytrends")
        .match_query(Matcher::UrlEncoded("ed".into(), ed.into()))
        .with_status(200)
        .with_header("content-type", "application/json; charset=utf-8")
        .with_body(body)
        .create_async()
        .await
}

// =============================================================================
// Fakes for the retry executor and search session
// =============================================================================

/// Points counter shared between a fake action and a fake signal
#[derive(Debug, Clone, Default)]
pub struct SharedPoints(pub Arc<AtomicU64>);

impl SharedPoints {
    #[allow(dead_code)]
    pub fn credit(&self) {
        self.0.fetch_add(3, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Success signal reading [`SharedPoints`] and counting reads
#[derive(Debug, Default)]
pub struct FakeSignal {
    pub points: SharedPoints,
    pub reads: u32,
}

impl SuccessSignal for FakeSignal {
    async fn current_value(&mut self) -> rewards_search::Result<u64> {
        self.reads += 1;
        Ok(self.points.get())
    }
}

/// Retry action recording attempt indexes; credits points on `credit_on`
#[derive(Debug, Default)]
pub struct CountingAction {
    pub calls: Vec<u32>,
    pub credit_on: Option<u32>,
    pub fail_on: Option<u32>,
    pub points: SharedPoints,
}

impl RetryAction for CountingAction {
    async fn run(&mut self, attempt: u32) -> rewards_search::Result<()> {
        self.calls.push(attempt);
        if self.fail_on == Some(attempt) {
            return Err(RewardsError::Browser("search box vanished".to_string()));
        }
        if self.credit_on == Some(attempt) {
            self.points.credit();
        }
        Ok(())
    }
}

/// Search driver recording submitted terms
///
/// Submissions whose 1-based global index is in `credited` earn points.
#[derive(Debug, Default)]
pub struct FakeDriver {
    pub submitted: Vec<String>,
    pub credited: HashSet<usize>,
    pub credit_all: bool,
    pub fail: bool,
    pub points: SharedPoints,
}

impl SearchDriver for FakeDriver {
    async fn submit_search(&mut self, term: &str) -> rewards_search::Result<()> {
        if self.fail {
            return Err(RewardsError::Browser("timeout waiting for #sb_form_q".to_string()));
        }
        self.submitted.push(term.to_string());
        if self.credit_all || self.credited.contains(&self.submitted.len()) {
            self.points.credit();
        }
        Ok(())
    }
}

/// Related-term provider answering `["<root> a", "<root> b"]`, or `[root]`
/// when `single` is set; records requested roots and fails when `fail` is set
#[derive(Debug, Default)]
pub struct FakeProvider {
    pub roots: Mutex<Vec<String>>,
    pub single: bool,
    pub fail: bool,
}

impl FakeProvider {
    #[allow(dead_code)]
    pub fn requested(&self) -> Vec<String> {
        self.roots.lock().unwrap().clone()
    }
}

impl RelatedTermProvider for FakeProvider {
    async fn fetch_related_terms(&self, term: &str) -> rewards_search::Result<Vec<String>> {
        self.roots.lock().unwrap().push(term.to_string());
        if self.fail {
            return Err(RewardsError::Fetch("autosuggest returned 503".to_string()));
        }
        if self.single {
            return Ok(vec![term.to_string()]);
        }
        Ok(vec![format!("{term} a"), format!("{term} b")])
    }
}
