use std::sync::Arc;

use strata_core::entry::{Entry, Layer, LayerName};
use strata_core::errors::{ResolveError, StrataResult};
use strata_store::TieredStore;
use tracing::trace;

use crate::merge;

/// Read-only view across the configured layers. Holds the rank-ordered layer
/// list for the engine lifetime; precedence is total and static.
pub struct Resolver {
    /// Best rank first.
    layers: Vec<Layer>,
    store: Arc<TieredStore>,
}

impl Resolver {
    /// `layers` must already be validated (unique names and ranks).
    pub fn new(mut layers: Vec<Layer>, store: Arc<TieredStore>) -> Self {
        layers.sort_by_key(|l| l.rank);
        Self { layers, store }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn has_layer(&self, layer: &LayerName) -> bool {
        self.layers.iter().any(|l| &l.name == layer)
    }

    /// Resolve `key` across all layers. The best-ranked entry wins; when it
    /// is structured, lower-layer structured fields it does not define are
    /// retained.
    pub fn resolve(&self, key: &str) -> StrataResult<Entry> {
        let found = self.resolve_all(key);
        let Some(top) = found.first() else {
            return Err(ResolveError::NotFound {
                key: key.to_string(),
            }
            .into());
        };

        trace!(key, layer = %top.layer, candidates = found.len(), "resolved");
        let mut entry = top.clone();
        if found.len() > 1 {
            entry.content = merge::merged_content(&found);
        }
        Ok(entry)
    }

    /// Every layer's entry for `key`, ordered best rank first. Empty when the
    /// key is absent everywhere.
    pub fn resolve_all(&self, key: &str) -> Vec<Entry> {
        self.layers
            .iter()
            .filter_map(|layer| self.store.get(&layer.name, key))
            .collect()
    }

    /// Layer-scoped lookup for boundary calls that name a layer explicitly.
    pub fn resolve_in(&self, layer: &LayerName, key: &str) -> StrataResult<Entry> {
        if !self.has_layer(layer) {
            return Err(ResolveError::UnknownLayer {
                layer: layer.to_string(),
            }
            .into());
        }
        self.store.get(layer, key).ok_or_else(|| {
            ResolveError::NotFoundInLayer {
                layer: layer.to_string(),
                key: key.to_string(),
            }
            .into()
        })
    }
}
