//! Shared configuration constants for rewards search
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Reserved key in the term pool holding the date the pool was loaded
///
/// Terms are always lower-cased before they are stored, so this camel-case
/// key can never collide with a real term.
pub const LOAD_DATE_KEY: &str = "loadDate";

/// Google Trends daily trends endpoint
pub const DEFAULT_TRENDS_URL: &str = "https://trends.google.com/trends/api/dailytrends";

/// Bing autosuggest endpoint used to expand a root term into related phrasings
pub const DEFAULT_RELATED_URL: &str = "https://api.bing.com/osjson.aspx";

/// Search engine home page that hosts the search box
pub const DEFAULT_SEARCH_URL: &str = "https://www.bing.com/";

/// Rewards dashboard exposing `dashboard.userStatus`
pub const DEFAULT_DASHBOARD_URL: &str = "https://rewards.bing.com/";

/// CSS selector of the search box on the search engine home page
pub const SEARCH_BOX_SELECTOR: &str = "#sb_form_q";

/// Maximum time to wait for the search box to become clickable (seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_SECS: u64 = 40;

/// Default maximum number of retries after the first search attempt
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Default base delay between attempts (seconds)
pub const DEFAULT_BASE_DELAY_SECS: f64 = 14.0625;

/// Default bounds of the pause after a credited search (seconds)
pub const DEFAULT_POST_SUCCESS_PAUSE: (u64, u64) = (30, 60);

/// Default bounds of the pause between two logical searches (seconds)
pub const DEFAULT_BETWEEN_SEARCHES_PAUSE: (u64, u64) = (200, 300);

/// How many days back the trends provider is walked before giving up
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 30;

/// Points credited per counted search; used to turn counters into a search count
pub const POINTS_PER_SEARCH: u64 = 3;

/// Prefix Google prepends to JSON responses to defeat JSON hijacking
pub const TRENDS_JSON_PREFIX: &str = ")]}',";

/// Chrome desktop user agent string
///
/// Updated: 2025-01-29 to Chrome 132 (current stable)
/// Next update: 2025-04-29 (quarterly schedule)
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36 Edg/132.0.2957.140";

/// Chrome mobile user agent string, same release as [`CHROME_USER_AGENT`]
pub const CHROME_MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.163 Mobile Safari/537.36 EdgA/132.0.2957.140";
