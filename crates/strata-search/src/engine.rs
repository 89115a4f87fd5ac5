use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use strata_core::constants::SEARCH_DEADLINE_STRIDE;
use strata_core::entry::{Entry, Layer, LayerName};
use strata_store::TieredStore;
use tracing::debug;

/// One matching entry with where and how often the query matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub entry: Entry,
    /// Byte offset of the earliest match in the entry's search text.
    pub first_match: usize,
    /// Number of non-overlapping matches.
    pub frequency: usize,
}

/// Outcome of one scan. `partial` is set when the cooperative deadline
/// expired before every candidate was inspected.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub partial: bool,
    /// How many candidate entries were actually inspected.
    pub scanned: usize,
}

/// Substring search over the store's current contents.
///
/// Ranking: earliest match position first, then higher match frequency, then
/// (layer rank, key) so repeated queries over unchanged data return hits in
/// the same order.
pub struct SearchEngine {
    store: Arc<TieredStore>,
    layer_ranks: HashMap<LayerName, u32>,
}

impl SearchEngine {
    pub fn new(store: Arc<TieredStore>, layers: &[Layer]) -> Self {
        let layer_ranks = layers.iter().map(|l| (l.name.clone(), l.rank)).collect();
        Self { store, layer_ranks }
    }

    /// Scan for `query`, optionally restricted to one layer.
    ///
    /// The clock is consulted every [`SEARCH_DEADLINE_STRIDE`] entries; when
    /// `deadline` has passed, the hits accumulated so far are returned with
    /// `partial = true`. An empty query matches nothing.
    pub fn search(
        &self,
        query: &str,
        layer: Option<&LayerName>,
        deadline: Option<Instant>,
    ) -> SearchResults {
        if query.is_empty() {
            return SearchResults::default();
        }
        let needle = query.to_lowercase();

        // Phase 1: layer filter narrows the candidate set before any
        // content is touched.
        let candidates = self.store.snapshot(layer);

        let mut results = SearchResults::default();
        for entry in candidates {
            if results.scanned % SEARCH_DEADLINE_STRIDE == 0 && results.scanned > 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        debug!(
                            scanned = results.scanned,
                            hits = results.hits.len(),
                            "search deadline reached, returning partial results"
                        );
                        results.partial = true;
                        break;
                    }
                }
            }
            results.scanned += 1;

            // Phase 2: case-insensitive substring match; search_text is
            // already lowercased.
            let haystack = entry.content.search_text();
            if let Some(first_match) = haystack.find(&needle) {
                let frequency = haystack.matches(&needle).count();
                results.hits.push(SearchHit {
                    entry,
                    first_match,
                    frequency,
                });
            }
        }

        results.hits.sort_by(|a, b| {
            a.first_match
                .cmp(&b.first_match)
                .then(b.frequency.cmp(&a.frequency))
                .then(self.rank_of(&a.entry.layer).cmp(&self.rank_of(&b.entry.layer)))
                .then(a.entry.key.cmp(&b.entry.key))
        });
        results
    }

    fn rank_of(&self, layer: &LayerName) -> u32 {
        self.layer_ranks.get(layer).copied().unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use strata_core::config::StoreConfig;
    use strata_core::entry::Content;

    fn layers() -> Vec<Layer> {
        vec![Layer::new("project", 1), Layer::new("universal", 2)]
    }

    fn store_with(entries: &[(&str, &str, &str)]) -> Arc<TieredStore> {
        let store = Arc::new(TieredStore::new(StoreConfig::default(), Vec::new()));
        for (layer, key, text) in entries {
            store
                .put(Entry::new(*layer, *key, Content::from(*text)))
                .unwrap();
        }
        store
    }

    #[test]
    fn matches_are_case_insensitive_and_filtered() {
        let store = store_with(&[
            ("project", "alpha", "Deploy Checklist for releases"),
            ("project", "beta", "nothing relevant here"),
            ("universal", "gamma", "deploy twice, deploy safely"),
            ("project", "delta", "pre-deploy steps"),
            ("universal", "unrelated", "lorem ipsum"),
        ]);
        let engine = SearchEngine::new(store, &layers());

        let results = engine.search("deploy", None, None);
        assert_eq!(results.hits.len(), 3);
        assert!(!results.partial);
        assert_eq!(results.scanned, 5);

        // Earliest match position wins: "Deploy..." and "deploy twice..."
        // both match at 0, frequency breaks the tie in gamma's favor.
        let keys: Vec<&str> = results.hits.iter().map(|h| h.entry.key.as_str()).collect();
        assert_eq!(keys, vec!["gamma", "alpha", "delta"]);

        // Repeat query over unchanged data returns the same order.
        let engine2 = SearchEngine::new(
            store_with(&[
                ("project", "alpha", "Deploy Checklist for releases"),
                ("project", "beta", "nothing relevant here"),
                ("universal", "gamma", "deploy twice, deploy safely"),
                ("project", "delta", "pre-deploy steps"),
                ("universal", "unrelated", "lorem ipsum"),
            ]),
            &layers(),
        );
        let again = engine2.search("deploy", None, None);
        let again_keys: Vec<&str> = again.hits.iter().map(|h| h.entry.key.as_str()).collect();
        assert_eq!(keys, again_keys);
    }

    #[test]
    fn layer_filter_narrows_candidates() {
        let store = store_with(&[
            ("project", "a", "needle here"),
            ("universal", "b", "needle there"),
        ]);
        let engine = SearchEngine::new(store, &layers());

        let results = engine.search("needle", Some(&"project".into()), None);
        assert_eq!(results.hits.len(), 1);
        assert_eq!(results.hits[0].entry.key, "a");
        assert_eq!(results.scanned, 1);
    }

    #[test]
    fn equal_position_and_frequency_falls_back_to_layer_rank_then_key() {
        let store = store_with(&[
            ("universal", "same", "match once"),
            ("project", "same", "match once"),
            ("project", "other", "match once"),
        ]);
        let engine = SearchEngine::new(store, &layers());

        let results = engine.search("match", None, None);
        let order: Vec<(String, String)> = results
            .hits
            .iter()
            .map(|h| (h.entry.layer.to_string(), h.entry.key.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("project".to_string(), "other".to_string()),
                ("project".to_string(), "same".to_string()),
                ("universal".to_string(), "same".to_string()),
            ]
        );
    }

    #[test]
    fn expired_deadline_returns_partial_results() {
        let entries: Vec<(String, String, String)> = (0..200)
            .map(|i| ("project".to_string(), format!("k{i:03}"), "needle".to_string()))
            .collect();
        let refs: Vec<(&str, &str, &str)> = entries
            .iter()
            .map(|(l, k, t)| (l.as_str(), k.as_str(), t.as_str()))
            .collect();
        let store = store_with(&refs);
        let engine = SearchEngine::new(store, &layers());

        let past = Instant::now() - Duration::from_millis(1);
        let results = engine.search("needle", None, Some(past));
        assert!(results.partial);
        // The first stride is always inspected before the clock check.
        assert_eq!(results.scanned, SEARCH_DEADLINE_STRIDE);
        assert_eq!(results.hits.len(), SEARCH_DEADLINE_STRIDE);
    }

    #[test]
    fn empty_query_matches_nothing() {
        let store = store_with(&[("project", "a", "anything")]);
        let engine = SearchEngine::new(store, &layers());
        let results = engine.search("", None, None);
        assert!(results.hits.is_empty());
        assert_eq!(results.scanned, 0);
    }
}
