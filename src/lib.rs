pub mod browser_setup;
pub mod config;
pub mod error;
pub mod retry;
pub mod term_cache;
pub mod term_source;
pub mod utils;
pub mod web_search;

pub use browser_setup::{
    BrowserSession, LaunchOptions, download_managed_browser, find_browser_executable,
    launch_browser,
};
pub use config::RewardsConfig;
pub use error::{Result, RewardsError};
pub use retry::{
    PauseRange, RetryAction, RetryExecutor, RetryOutcome, RetryPolicy, RetryStrategy,
    SuccessSignal,
};
pub use term_cache::TermCache;
pub use term_source::{RelatedTermProvider, TermSource, TermSourceSettings};
pub use web_search::{
    BatchReport, BingSearchDriver, DeviceKind, RemainingSearches, RewardsDashboard, SearchDriver,
    SearchSession, TermCycle,
};
