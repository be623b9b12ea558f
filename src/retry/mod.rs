//! Bounded retry with constant or exponential backoff plus jitter
//!
//! [`RetryPolicy`] holds the configuration, [`RetryExecutor`] runs a
//! [`RetryAction`] until a [`SuccessSignal`] advances.

mod executor;
mod policy;

pub use executor::{RetryAction, RetryExecutor, RetryOutcome, SuccessSignal};
pub use policy::{PauseRange, RetryPolicy, RetryStrategy};
