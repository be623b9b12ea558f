//! Data structures for the search session

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::constants::{CHROME_MOBILE_USER_AGENT, CHROME_USER_AGENT, POINTS_PER_SEARCH};

// =============================================================================
// Capabilities
// =============================================================================

/// UI capability: type one term into the search box and submit it
#[allow(async_fn_in_trait)]
pub trait SearchDriver {
    async fn submit_search(&mut self, term: &str) -> Result<()>;
}

// =============================================================================
// Term rotation
// =============================================================================

/// Wrap-around sequence of alternate phrasings for one logical search
///
/// Holds at least one term; each call to [`TermCycle::next_term`] advances by
/// one and wraps at the end.
#[derive(Debug, Clone)]
pub struct TermCycle {
    terms: Vec<String>,
    position: usize,
}

impl TermCycle {
    /// `None` for an empty sequence
    #[must_use]
    pub fn new(terms: Vec<String>) -> Option<Self> {
        if terms.is_empty() {
            return None;
        }
        Some(Self { terms, position: 0 })
    }

    /// Current term, then advance
    pub fn next_term(&mut self) -> &str {
        let index = self.position % self.terms.len();
        self.position = (index + 1) % self.terms.len();
        &self.terms[index]
    }

    /// Restart at the first term
    pub fn reset(&mut self) {
        self.position = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Always false; present for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// =============================================================================
// Devices and counters
// =============================================================================

/// Which rewards search counter the session works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceKind {
    #[must_use]
    pub fn user_agent(&self) -> &'static str {
        match self {
            DeviceKind::Desktop => CHROME_USER_AGENT,
            DeviceKind::Mobile => CHROME_MOBILE_USER_AGENT,
        }
    }

    #[must_use]
    pub fn window_size(&self) -> (u32, u32) {
        match self {
            DeviceKind::Desktop => (1920, 1080),
            DeviceKind::Mobile => (412, 915),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Desktop => f.write_str("desktop"),
            DeviceKind::Mobile => f.write_str("mobile"),
        }
    }
}

/// One search counter from `dashboard.userStatus.counters`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCounter {
    pub point_progress: u64,
    pub point_progress_max: u64,
}

/// `dashboard.userStatus.counters`, search entries only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCounters {
    #[serde(default)]
    pub pc_search: Vec<SearchCounter>,
    #[serde(default)]
    pub mobile_search: Vec<SearchCounter>,
}

/// `dashboard.userStatus`, fields this crate reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub available_points: u64,
    #[serde(default)]
    pub counters: SearchCounters,
}

/// Searches still worth points today, per device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemainingSearches {
    pub desktop: u32,
    pub mobile: u32,
}

impl RemainingSearches {
    #[must_use]
    pub fn from_counters(counters: &SearchCounters) -> Self {
        Self {
            desktop: remaining(&counters.pc_search),
            mobile: remaining(&counters.mobile_search),
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.desktop.saturating_add(self.mobile)
    }

    #[must_use]
    pub fn for_device(&self, device: DeviceKind) -> u32 {
        match device {
            DeviceKind::Desktop => self.desktop,
            DeviceKind::Mobile => self.mobile,
        }
    }
}

fn remaining(counters: &[SearchCounter]) -> u32 {
    let points: u64 = counters
        .iter()
        .map(|c| c.point_progress_max.saturating_sub(c.point_progress))
        .sum();
    u32::try_from(points / POINTS_PER_SEARCH).unwrap_or(u32::MAX)
}

// =============================================================================
// Reports
// =============================================================================

/// Outcome tally of one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: u32,
    pub succeeded: u32,
    pub exhausted: u32,
}
