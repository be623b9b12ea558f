//! Rewarded web searches driven through browser automation
//!
//! [`SearchSession`] is generic over the UI capability ([`SearchDriver`]) and
//! the points counter ([`crate::retry::SuccessSignal`]); [`BingSearchDriver`]
//! and [`RewardsDashboard`] are the chromiumoxide implementations used by the
//! binary.

mod dashboard;
mod driver;
mod session;
mod types;

// Re-export public types
pub use dashboard::RewardsDashboard;
pub use driver::BingSearchDriver;
pub use session::SearchSession;
pub use types::{
    BatchReport, DeviceKind, RemainingSearches, SearchCounter, SearchCounters, SearchDriver,
    TermCycle, UserStatus,
};
