//! Retry policy: attempt budget, backoff strategy, and jitter
//!
//! A [`RetryPolicy`] is built once at startup from the `retries` section of the
//! configuration and handed to every [`super::RetryExecutor`]. Nothing here is
//! global: two executors with different policies can coexist.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RewardsError};

/// Method used to grow the delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RetryStrategy {
    /// The same `base_delay` before every retry
    Constant,
    /// `base_delay * 2^(attempt - 1)` before retry number `attempt`
    Exponential,
}

impl FromStr for RetryStrategy {
    type Err = RewardsError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "CONSTANT" => Ok(RetryStrategy::Constant),
            "EXPONENTIAL" => Ok(RetryStrategy::Exponential),
            other => Err(RewardsError::Configuration(format!(
                "unknown retry strategy '{other}' (expected CONSTANT or EXPONENTIAL)"
            ))),
        }
    }
}

impl TryFrom<String> for RetryStrategy {
    type Error = RewardsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RetryStrategy> for String {
    fn from(strategy: RetryStrategy) -> Self {
        strategy.to_string()
    }
}

impl fmt::Display for RetryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryStrategy::Constant => f.write_str("CONSTANT"),
            RetryStrategy::Exponential => f.write_str("EXPONENTIAL"),
        }
    }
}

/// Immutable retry configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_secs: f64,
    strategy: RetryStrategy,
}

impl RetryPolicy {
    /// Create a policy, rejecting a base delay that is not a positive finite number
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] for a zero, negative, or non-finite delay.
    pub fn new(max_retries: u32, base_delay_secs: f64, strategy: RetryStrategy) -> Result<Self> {
        if !base_delay_secs.is_finite() || base_delay_secs <= 0.0 {
            return Err(RewardsError::Configuration(format!(
                "retries.base_delay_in_seconds must be a positive number, got {base_delay_secs}"
            )));
        }

        Ok(Self {
            max_retries,
            base_delay_secs,
            strategy,
        })
    }

    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Upper bound on the number of attempts in one sequence
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    #[must_use]
    pub fn strategy(&self) -> RetryStrategy {
        self.strategy
    }

    /// Delay before `attempt`, excluding jitter
    ///
    /// Attempt 0 is the first try and never waits.
    #[must_use]
    pub fn base_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let secs = match self.strategy {
            RetryStrategy::Constant => self.base_delay_secs,
            RetryStrategy::Exponential => {
                // 2^1024 overflows to infinity, which saturates below
                let exp = (attempt - 1).min(1024) as i32;
                self.base_delay_secs * 2f64.powi(exp)
            }
        };

        secs_to_duration(secs)
    }

    /// Delay before `attempt` with a caller-supplied jitter fraction in `[0, 1)`
    ///
    /// Jitter adds `base_delay_secs * fraction` on top of [`Self::base_delay`].
    #[must_use]
    pub fn delay_with_jitter(&self, attempt: u32, fraction: f64) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let jitter = self.base_delay_secs * fraction.clamp(0.0, 1.0);
        self.base_delay(attempt).saturating_add(secs_to_duration(jitter))
    }

    /// Delay before `attempt` with a freshly drawn uniform jitter
    #[must_use]
    pub fn sample_delay(&self, attempt: u32) -> Duration {
        let fraction: f64 = rand::rng().random();
        self.delay_with_jitter(attempt, fraction)
    }
}

/// Inclusive range of whole seconds to pause for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseRange {
    pub min: u64,
    pub max: u64,
}

impl PauseRange {
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] when `min > max`.
    pub fn new(min: u64, max: u64) -> Result<Self> {
        let range = Self { min, max };
        range.validate("pause")?;
        Ok(range)
    }

    /// A range that never pauses
    #[must_use]
    pub const fn none() -> Self {
        Self { min: 0, max: 0 }
    }

    pub(crate) fn validate(&self, name: &str) -> Result<()> {
        if self.min > self.max {
            return Err(RewardsError::Configuration(format!(
                "{name}: min ({}) must not exceed max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draw a pause uniformly from the range
    #[must_use]
    pub fn sample(&self) -> Duration {
        if self.min >= self.max {
            return Duration::from_secs(self.min);
        }
        Duration::from_secs(rand::rng().random_range(self.min..=self.max))
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
