//! Error types for the term cache, term source, and search session
//!
//! Fatal errors abort the whole run. Search exhaustion is not an error here:
//! it is reported through [`crate::retry::RetryOutcome::Exhausted`] so the
//! batch can move on to the next search.

use thiserror::Error;

/// Result type alias for rewards search operations
pub type Result<T> = std::result::Result<T, RewardsError>;

/// Error types for rewards search operations
#[derive(Debug, Error)]
pub enum RewardsError {
    /// The persisted term pool could not be opened, read, or written
    #[error("Term pool storage error: {0}")]
    Storage(String),

    /// A trend or related-term provider call failed or returned an unexpected shape
    #[error("Failed to fetch terms: {0}")]
    Fetch(String),

    /// The term pool has no terms to offer
    #[error("Term pool is empty; refresh it before searching")]
    EmptyPool,

    /// Invalid configuration value (unknown retry strategy, bad pause range, ...)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The browser could not perform a UI interaction or read the points counter
    #[error("Browser interaction failed: {0}")]
    Browser(String),
}

impl From<sqlx::Error> for RewardsError {
    fn from(error: sqlx::Error) -> Self {
        RewardsError::Storage(error.to_string())
    }
}

impl From<reqwest::Error> for RewardsError {
    fn from(error: reqwest::Error) -> Self {
        RewardsError::Fetch(error.to_string())
    }
}

impl RewardsError {
    /// Short machine-friendly label used in log fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RewardsError::Storage(_) => "storage",
            RewardsError::Fetch(_) => "fetch",
            RewardsError::EmptyPool => "empty_pool",
            RewardsError::Configuration(_) => "configuration",
            RewardsError::Browser(_) => "browser",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(RewardsError::EmptyPool.kind(), "empty_pool");
        assert_eq!(RewardsError::Fetch("429".into()).kind(), "fetch");
        assert_eq!(
            RewardsError::Configuration("bad strategy".into()).kind(),
            "configuration"
        );
    }

    #[test]
    fn test_sqlx_errors_are_storage() {
        let error: RewardsError = sqlx::Error::PoolClosed.into();
        assert_eq!(error.kind(), "storage");
    }
}
