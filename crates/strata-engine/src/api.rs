//! Serde DTOs for a transport boundary. Each type maps 1:1 onto one engine
//! operation so a host can drive the engine over JSON without touching
//! internal types.

use serde::{Deserialize, Serialize};
use strata_core::entry::{Content, Entry};
use strata_core::errors::FailureKind;
use strata_executor::Outcome;
use strata_search::{SearchHit, SearchResults};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    /// Restrict resolution to one layer; omit for the full precedence walk.
    #[serde(default)]
    pub layer: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    pub layer: String,
    pub key: String,
    pub content: Content,
    /// "primary", "stale_cache", or "default_value".
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_by: Option<FailureKind>,
}

impl From<&Outcome<Entry>> for GetResponse {
    fn from(outcome: &Outcome<Entry>) -> Self {
        Self {
            layer: outcome.value.layer.to_string(),
            key: outcome.value.key.clone(),
            content: outcome.value.content.clone(),
            source: outcome.source.as_str().to_string(),
            degraded_by: outcome.degraded_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub layer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHitView {
    pub layer: String,
    pub key: String,
    pub first_match: usize,
    pub frequency: usize,
}

impl From<&SearchHit> for SearchHitView {
    fn from(hit: &SearchHit) -> Self {
        Self {
            layer: hit.entry.layer.to_string(),
            key: hit.entry.key.clone(),
            first_match: hit.first_match,
            frequency: hit.frequency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHitView>,
    pub partial: bool,
    pub scanned: usize,
    pub source: String,
}

impl From<&Outcome<SearchResults>> for SearchResponse {
    fn from(outcome: &Outcome<SearchResults>) -> Self {
        Self {
            hits: outcome.value.hits.iter().map(SearchHitView::from).collect(),
            partial: outcome.value.partial,
            scanned: outcome.value.scanned,
            source: outcome.source.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_executor::OutcomeSource;

    #[test]
    fn get_response_carries_degradation() {
        let entry = Entry::new("project", "greeting", Content::from("hello"));
        let outcome = Outcome {
            value: entry,
            source: OutcomeSource::StaleCache,
            degraded_by: Some(FailureKind::Timeout),
        };
        let response = GetResponse::from(&outcome);
        assert_eq!(response.source, "stale_cache");
        assert_eq!(response.degraded_by, Some(FailureKind::Timeout));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["layer"], "project");
        assert_eq!(json["degraded_by"], "timeout");
    }

    #[test]
    fn requests_accept_minimal_json() {
        let get: GetRequest = serde_json::from_str(r#"{"key": "a"}"#).unwrap();
        assert!(get.layer.is_none());

        let search: SearchRequest = serde_json::from_str(r#"{"query": "q"}"#).unwrap();
        assert!(search.layer.is_none());
    }
}
