//! Autosuggest (OpenSearch JSON) wire format
//!
//! The provider answers `["<query>", ["suggestion", ...]]`.

use serde_json::Value;

use crate::error::{Result, RewardsError};

/// Related phrasings for `term`, falling back to `[term]` when there are none
pub(crate) fn parse_related_terms(term: &str, body: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RewardsError::Fetch(format!("unexpected related terms payload: {e}")))?;

    let suggestions = value
        .as_array()
        .and_then(|outer| outer.get(1))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            RewardsError::Fetch(format!(
                "related terms payload for '{term}' is not a [query, [suggestions]] array"
            ))
        })?;

    let related: Vec<String> = suggestions
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if related.is_empty() {
        return Ok(vec![term.to_string()]);
    }
    Ok(related)
}
