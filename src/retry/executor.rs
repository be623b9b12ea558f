//! Bounded retry driven by an externally observed success signal
//!
//! Unlike a classic retry-on-error loop, an attempt here "fails" when the
//! action completes but the signal (the points counter) has not moved. The
//! baseline is read once when the sequence starts; every attempt compares
//! against that same baseline.

use std::time::Duration;

use tracing::{debug, error, info};

use super::policy::{PauseRange, RetryPolicy};
use crate::error::Result;

/// One externally observable operation, re-run on every attempt
///
/// Implementations may carry state between attempts (for example rotating
/// to the next phrasing of a search term).
#[allow(async_fn_in_trait)]
pub trait RetryAction {
    async fn run(&mut self, attempt: u32) -> Result<()>;
}

/// Monotonic counter whose increase means the action was credited
#[allow(async_fn_in_trait)]
pub trait SuccessSignal {
    async fn current_value(&mut self) -> Result<u64>;
}

/// Terminal state of one retry sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    /// The signal advanced after `attempts` attempts
    Succeeded { attempts: u32 },
    /// Every allowed attempt ran without the signal advancing
    Exhausted { attempts: u32 },
}

impl RetryOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, RetryOutcome::Succeeded { .. })
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts } | RetryOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }
}

/// Runs an action until the success signal advances or the policy is spent
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    post_success_pause: PauseRange,
}

impl RetryExecutor {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            post_success_pause: PauseRange::none(),
        }
    }

    /// Pause drawn from `range` after a credited attempt
    #[must_use]
    pub fn with_post_success_pause(mut self, range: PauseRange) -> Self {
        self.post_success_pause = range;
        self
    }

    /// Drive `action` until `signal` rises above its starting value
    ///
    /// Exhaustion is returned as [`RetryOutcome::Exhausted`], not as an error.
    ///
    /// # Errors
    ///
    /// Errors from the action or from reading the signal abort the sequence
    /// immediately and are returned unchanged.
    pub async fn run<A, S>(&self, action: &mut A, signal: &mut S) -> Result<RetryOutcome>
    where
        A: RetryAction,
        S: SuccessSignal,
    {
        let max_retries = self.policy.max_retries();
        let baseline = signal.current_value().await?;
        debug!("Success signal baseline: {}", baseline);

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = self.policy.sample_delay(attempt);
                debug!(
                    "[BING] Search attempt not counted {}/{}, sleeping {:.2} seconds...",
                    attempt,
                    max_retries,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
            }

            action.run(attempt).await?;

            let current = signal.current_value().await?;
            if current > baseline {
                let pause = self.post_success_pause.sample();
                info!(
                    "[BING] Search credited on attempt {} ({} -> {} points)",
                    attempt + 1,
                    baseline,
                    current
                );
                pause_after_success(pause).await;
                return Ok(RetryOutcome::Succeeded {
                    attempts: attempt + 1,
                });
            }
        }

        error!("[BING] Reached max search attempt retries");
        Ok(RetryOutcome::Exhausted {
            attempts: self.policy.max_attempts(),
        })
    }
}

async fn pause_after_success(pause: Duration) {
    if pause.is_zero() {
        return;
    }
    debug!("Pausing {}s after credited search", pause.as_secs());
    tokio::time::sleep(pause).await;
}
