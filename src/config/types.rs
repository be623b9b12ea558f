//! Core configuration types for rewards search
//!
//! Every section deserializes with defaults, so a partial `config.yaml` (or
//! none at all) yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::retry::{PauseRange, RetryStrategy};
use crate::utils::constants::{
    DEFAULT_BASE_DELAY_SECS, DEFAULT_BETWEEN_SEARCHES_PAUSE, DEFAULT_DASHBOARD_URL,
    DEFAULT_ELEMENT_TIMEOUT_SECS, DEFAULT_MAX_LOOKBACK_DAYS, DEFAULT_MAX_RETRIES,
    DEFAULT_POST_SUCCESS_PAUSE, DEFAULT_RELATED_URL, DEFAULT_SEARCH_URL, DEFAULT_TRENDS_URL,
};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    pub retries: RetriesConfig,
    pub pauses: PausesConfig,
    pub locale: LocaleConfig,
    pub terms: TermsConfig,
    pub browser: BrowserConfig,
}

/// `retries` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetriesConfig {
    /// Retries after the first attempt of a search
    pub max: u32,
    /// Base delay between attempts, in seconds
    pub base_delay_in_seconds: f64,
    /// Exactly `CONSTANT` or `EXPONENTIAL` (upper case); anything else fails to load
    pub strategy: RetryStrategy,
}

impl Default for RetriesConfig {
    fn default() -> Self {
        Self {
            max: DEFAULT_MAX_RETRIES,
            base_delay_in_seconds: DEFAULT_BASE_DELAY_SECS,
            strategy: RetryStrategy::Constant,
        }
    }
}

/// `pauses` section, all values in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PausesConfig {
    /// Pause after a search was credited
    pub post_success: PauseRange,
    /// Pause between two logical searches, whatever their outcome
    pub between_searches: PauseRange,
}

impl Default for PausesConfig {
    fn default() -> Self {
        let (success_min, success_max) = DEFAULT_POST_SUCCESS_PAUSE;
        let (between_min, between_max) = DEFAULT_BETWEEN_SEARCHES_PAUSE;
        Self {
            post_success: PauseRange {
                min: success_min,
                max: success_max,
            },
            between_searches: PauseRange {
                min: between_min,
                max: between_max,
            },
        }
    }
}

/// `locale` section, forwarded to the trends provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub language: String,
    pub geo: String,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            geo: "US".to_string(),
        }
    }
}

/// `terms` section: term pool storage and providers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TermsConfig {
    /// SQLite file holding the term pool; `None` resolves under the data dir
    pub storage_path: Option<PathBuf>,
    /// Days walked back from yesterday before giving up on filling the pool
    pub max_lookback_days: u32,
    pub trends_url: String,
    pub related_url: String,
}

impl Default for TermsConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
            trends_url: DEFAULT_TRENDS_URL.to_string(),
            related_url: DEFAULT_RELATED_URL.to_string(),
        }
    }
}

/// `browser` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Persistent Chrome profile holding the signed-in session
    pub user_data_dir: Option<PathBuf>,
    pub search_url: String,
    pub dashboard_url: String,
    /// How long to wait for the search box to become clickable
    pub element_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            user_data_dir: None,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            dashboard_url: DEFAULT_DASHBOARD_URL.to_string(),
            element_timeout_secs: DEFAULT_ELEMENT_TIMEOUT_SECS,
        }
    }
}
