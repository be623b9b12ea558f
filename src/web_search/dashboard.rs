//! Points counter read from the rewards dashboard
//!
//! The dashboard page exposes its state as a global `dashboard` object. It is
//! reloaded in its own tab on every read so the search tab is never disturbed.

use anyhow::{Context, anyhow};
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use tracing::debug;

use super::types::{RemainingSearches, UserStatus};
use crate::error::{Result, RewardsError};
use crate::retry::SuccessSignal;

/// Expression returning `dashboard.userStatus` as a JSON string
const USER_STATUS_JS: &str = "JSON.stringify(dashboard.userStatus)";

/// Dedicated tab on the rewards dashboard
pub struct RewardsDashboard {
    page: Page,
    dashboard_url: String,
}

impl RewardsDashboard {
    pub async fn open(browser: &Browser, dashboard_url: &str) -> anyhow::Result<Self> {
        let page = browser
            .new_page(dashboard_url)
            .await
            .context("Failed to open rewards dashboard")?;
        page.wait_for_navigation()
            .await
            .context("Failed to wait for rewards dashboard load")?;

        Ok(Self {
            page,
            dashboard_url: dashboard_url.to_string(),
        })
    }

    /// Reload the dashboard and read `dashboard.userStatus`
    pub async fn user_status(&self) -> Result<UserStatus> {
        self.read_user_status()
            .await
            .map_err(|e| RewardsError::Browser(format!("{e:#}")))
    }

    /// Searches still worth points today
    pub async fn remaining_searches(&self) -> Result<RemainingSearches> {
        let status = self.user_status().await?;
        let remaining = RemainingSearches::from_counters(&status.counters);
        debug!("Remaining searches: {:?}", remaining);
        Ok(remaining)
    }

    async fn read_user_status(&self) -> anyhow::Result<UserStatus> {
        self.page
            .goto(self.dashboard_url.as_str())
            .await
            .context("Failed to reload rewards dashboard")?;
        self.page
            .wait_for_navigation()
            .await
            .context("Failed to wait for rewards dashboard reload")?;

        let raw: String = self
            .page
            .evaluate(USER_STATUS_JS)
            .await
            .context("Failed to evaluate dashboard.userStatus (signed out?)")?
            .into_value()
            .map_err(|e| anyhow!("dashboard.userStatus is not a string: {e}"))?;

        serde_json::from_str(&raw).context("Unexpected dashboard.userStatus shape")
    }
}

impl SuccessSignal for RewardsDashboard {
    async fn current_value(&mut self) -> Result<u64> {
        let points = self.user_status().await?.available_points;
        debug!("Account points: {}", points);
        Ok(points)
    }
}
