//! Configuration module for rewards search
//!
//! This module provides the `RewardsConfig` struct, loaded from YAML with
//! per-section defaults and validated before anything runs.

// Sub-modules
pub mod methods;
pub mod types;

// Re-exports for public API
pub use types::{
    BrowserConfig, LocaleConfig, PausesConfig, RetriesConfig, RewardsConfig, TermsConfig,
};
