//! Google Trends daily-trends wire format
//!
//! The endpoint answers with JSON preceded by `)]}',` and a newline. Only the
//! first day of `trendingSearchesDays` is read: each request already targets a
//! single day through the `ed` parameter.

use serde::Deserialize;

use crate::error::{Result, RewardsError};
use crate::utils::constants::TRENDS_JSON_PREFIX;

#[derive(Debug, Deserialize)]
struct DailyTrends {
    default: DailyTrendsBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyTrendsBody {
    #[serde(default)]
    trending_searches_days: Vec<TrendingDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingDay {
    #[serde(default)]
    trending_searches: Vec<TrendingSearch>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrendingSearch {
    title: Query,
    #[serde(default)]
    related_queries: Vec<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    query: String,
}

/// Extract the lower-cased primary and related queries of one trends response
///
/// Order follows the document; duplicates are left for the caller to fold.
pub(crate) fn parse_daily_trends(body: &str) -> Result<Vec<String>> {
    let trimmed = body.trim_start();
    let json = trimmed.strip_prefix(TRENDS_JSON_PREFIX).unwrap_or(trimmed);

    let trends: DailyTrends = serde_json::from_str(json)
        .map_err(|e| RewardsError::Fetch(format!("unexpected daily trends payload: {e}")))?;

    let Some(day) = trends.default.trending_searches_days.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut terms = Vec::new();
    for search in day.trending_searches {
        push_normalized(&mut terms, &search.title.query);
        for related in &search.related_queries {
            push_normalized(&mut terms, &related.query);
        }
    }
    Ok(terms)
}

fn push_normalized(terms: &mut Vec<String>, raw: &str) {
    let term = raw.trim().to_lowercase();
    if !term.is_empty() {
        terms.push(term);
    }
}
