//! Loading, validation, and derived values for `RewardsConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::RewardsConfig;
use crate::error::{Result, RewardsError};
use crate::retry::RetryPolicy;

/// Directory under the platform data dir holding the term pool and profile
const APP_DIR: &str = "rewards_search";

impl RewardsConfig {
    /// Load configuration from a YAML file
    ///
    /// A missing file yields the defaults. Validation runs before returning, so
    /// an unknown retry strategy or an inverted pause range fails here, before
    /// any search is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] for unreadable, malformed, or
    /// invalid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            RewardsError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml_str(&raw)
    }

    /// Parse and validate configuration from a YAML document
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] when the document does not
    /// deserialize or fails validation.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw)
                .map_err(|e| RewardsError::Configuration(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        self.retry_policy()?;
        self.pauses.post_success.validate("pauses.post_success")?;
        self.pauses
            .between_searches
            .validate("pauses.between_searches")?;

        if self.locale.language.trim().is_empty() || self.locale.geo.trim().is_empty() {
            return Err(RewardsError::Configuration(
                "locale.language and locale.geo must not be empty".to_string(),
            ));
        }
        if self.terms.max_lookback_days == 0 {
            return Err(RewardsError::Configuration(
                "terms.max_lookback_days must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("terms.trends_url", &self.terms.trends_url),
            ("terms.related_url", &self.terms.related_url),
            ("browser.search_url", &self.browser.search_url),
            ("browser.dashboard_url", &self.browser.dashboard_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| RewardsError::Configuration(format!("{name} '{value}': {e}")))?;
        }

        Ok(())
    }

    /// Build the retry policy from the `retries` section
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] for a non-positive base delay.
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.retries.max,
            self.retries.base_delay_in_seconds,
            self.retries.strategy,
        )
    }

    /// Term pool location: configured path, else `<data_dir>/rewards_search/google_trends.sqlite`
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] when no path is configured and
    /// the platform has no data directory.
    pub fn storage_path(&self) -> Result<PathBuf> {
        match &self.terms.storage_path {
            Some(path) => Ok(path.clone()),
            None => Ok(app_data_dir()?.join("google_trends.sqlite")),
        }
    }

    /// Chrome profile location: configured path, else `<data_dir>/rewards_search/profile`
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Configuration`] when no path is configured and
    /// the platform has no data directory.
    pub fn user_data_dir(&self) -> Result<PathBuf> {
        match &self.browser.user_data_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(app_data_dir()?.join("profile")),
        }
    }
}

fn app_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| {
            RewardsError::Configuration(
                "no platform data directory; set terms.storage_path and browser.user_data_dir"
                    .to_string(),
            )
        })
}
