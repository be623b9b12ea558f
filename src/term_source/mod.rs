//! Candidate search terms from external providers
//!
//! Two providers feed the search loop:
//! - Google Trends daily trends, walked backwards one day at a time to fill
//!   the daily term pool
//! - Bing autosuggest, expanding one root term into alternate phrasings
//!
//! Provider failures surface as [`RewardsError::Fetch`] and are never retried
//! here.

mod related;
mod trends;

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::RewardsConfig;
use crate::error::{Result, RewardsError};

/// Timeout applied to every provider request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Expands a root term into the phrasings tried on successive attempts
#[allow(async_fn_in_trait)]
pub trait RelatedTermProvider {
    /// Never returns an empty vector
    async fn fetch_related_terms(&self, term: &str) -> Result<Vec<String>>;
}

/// Provider endpoints and request parameters
#[derive(Debug, Clone)]
pub struct TermSourceSettings {
    pub trends_url: String,
    pub related_url: String,
    pub language: String,
    pub geo: String,
    pub user_agent: String,
    pub max_lookback_days: u32,
}

impl TermSourceSettings {
    #[must_use]
    pub fn from_config(config: &RewardsConfig, user_agent: &str) -> Self {
        Self {
            trends_url: config.terms.trends_url.clone(),
            related_url: config.terms.related_url.clone(),
            language: config.locale.language.clone(),
            geo: config.locale.geo.clone(),
            user_agent: user_agent.to_string(),
            max_lookback_days: config.terms.max_lookback_days,
        }
    }
}

/// HTTP client for the trends and related-terms providers
#[derive(Debug, Clone)]
pub struct TermSource {
    client: Client,
    settings: TermSourceSettings,
}

impl TermSource {
    /// # Errors
    ///
    /// Returns [`RewardsError::Fetch`] if the HTTP client cannot be built.
    pub fn new(settings: TermSourceSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self { client, settings })
    }

    /// Collect `desired_count` distinct lower-cased trending terms, starting yesterday
    ///
    /// # Errors
    ///
    /// Returns [`RewardsError::Fetch`] on a failed request, an unparseable
    /// payload, or when the lookback window runs out before enough terms.
    pub async fn fetch_trending_terms(&self, desired_count: usize) -> Result<Vec<String>> {
        self.fetch_trending_terms_from(Local::now().date_naive(), desired_count)
            .await
    }

    /// Same as [`Self::fetch_trending_terms`] with an explicit "today"
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_trending_terms`].
    pub async fn fetch_trending_terms_from(
        &self,
        today: NaiveDate,
        desired_count: usize,
    ) -> Result<Vec<String>> {
        if desired_count == 0 {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut terms = Vec::with_capacity(desired_count);

        for offset in 1..=self.settings.max_lookback_days {
            let day = today
                .checked_sub_days(Days::new(u64::from(offset)))
                .ok_or_else(|| RewardsError::Fetch(format!("date underflow at {offset} days")))?;

            let batch = self.fetch_daily_trends(day).await?;
            let fetched = batch.len();
            for term in batch {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
            debug!(
                "Trends for {}: {} queries, {}/{} distinct terms so far",
                day,
                fetched,
                terms.len(),
                desired_count
            );

            if terms.len() >= desired_count {
                terms.truncate(desired_count);
                info!(
                    "Collected {} trending terms across {} day(s)",
                    terms.len(),
                    offset
                );
                return Ok(terms);
            }
        }

        Err(RewardsError::Fetch(format!(
            "only {} of {} distinct trending terms after looking back {} days",
            terms.len(),
            desired_count,
            self.settings.max_lookback_days
        )))
    }

    /// Raw terms of one trends day
    async fn fetch_daily_trends(&self, day: NaiveDate) -> Result<Vec<String>> {
        let mut url = Url::parse(&self.settings.trends_url)
            .map_err(|e| RewardsError::Fetch(format!("invalid trends URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("hl", &self.settings.language)
            .append_pair("ed", &day.format("%Y%m%d").to_string())
            .append_pair("geo", &self.settings.geo)
            .append_pair("ns", "15");

        let body = self.get_text(url).await?;
        trends::parse_daily_trends(&body)
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(RewardsError::Fetch(format!(
                "{} returned status {}",
                url.path(),
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

impl RelatedTermProvider for TermSource {
    async fn fetch_related_terms(&self, term: &str) -> Result<Vec<String>> {
        let mut url = Url::parse(&self.settings.related_url)
            .map_err(|e| RewardsError::Fetch(format!("invalid related terms URL: {e}")))?;
        url.query_pairs_mut().append_pair("query", term);

        let body = self.get_text(url).await?;
        let related = related::parse_related_terms(term, &body)?;
        debug!("Related terms for '{}': {:?}", term, related);
        Ok(related)
    }
}
