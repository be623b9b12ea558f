//! chromiumoxide implementation of the search box interaction
//!
//! Each submission waits for the search box to become clickable, clears it,
//! types the term, and presses Enter. The results page carries the same search
//! box, so the next attempt starts from wherever the previous one landed.

use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use tracing::{debug, info};

use super::types::SearchDriver;
use crate::error::{Result, RewardsError};
use crate::utils::constants::SEARCH_BOX_SELECTOR;

/// Poll interval while waiting for an element
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pause between UI steps, to look less scripted
const STEP_PAUSE: Duration = Duration::from_secs(1);

/// Search box driver bound to one browser tab
pub struct BingSearchDriver {
    page: Page,
    element_timeout: Duration,
}

impl BingSearchDriver {
    /// Open a tab on `search_url`
    pub async fn open(
        browser: &Browser,
        search_url: &str,
        element_timeout: Duration,
    ) -> anyhow::Result<Self> {
        info!("Navigating to search page: {}", search_url);
        let page = browser
            .new_page(search_url)
            .await
            .context("Failed to open search page")?;
        page.wait_for_navigation()
            .await
            .context("Failed to wait for search page load")?;

        Ok(Self {
            page,
            element_timeout,
        })
    }

    /// Poll until `selector` resolves to an element with a clickable point
    async fn wait_until_clickable(&self, selector: &str) -> anyhow::Result<Element> {
        let start = Instant::now();

        loop {
            if let Ok(element) = self.page.find_element(selector).await
                && element.clickable_point().await.is_ok()
            {
                debug!(
                    "'{}' clickable after {:.2}s",
                    selector,
                    start.elapsed().as_secs_f64()
                );
                return Ok(element);
            }

            if start.elapsed() >= self.element_timeout {
                let url = self
                    .page
                    .url()
                    .await
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| "about:blank".to_string());
                return Err(anyhow!(
                    "Timeout waiting for '{selector}' to become clickable after {:?} on {url}",
                    self.element_timeout
                ));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn submit(&self, term: &str) -> anyhow::Result<()> {
        let search_box = self.wait_until_clickable(SEARCH_BOX_SELECTOR).await?;

        search_box
            .click()
            .await
            .context("Failed to focus search box")?;
        search_box
            .call_js_fn("function() { this.value = ''; }", false)
            .await
            .context("Failed to clear search box")?;

        tokio::time::sleep(STEP_PAUSE).await;
        search_box
            .type_str(term)
            .await
            .context("Failed to type search term")?;

        tokio::time::sleep(STEP_PAUSE).await;
        search_box
            .press_key("Enter")
            .await
            .context("Failed to submit search")?;

        self.page
            .wait_for_navigation()
            .await
            .context("Failed to wait for results page")?;
        Ok(())
    }
}

impl SearchDriver for BingSearchDriver {
    async fn submit_search(&mut self, term: &str) -> Result<()> {
        self.submit(term)
            .await
            .map_err(|e| RewardsError::Browser(format!("{e:#}")))
    }
}
