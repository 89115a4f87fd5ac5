use serde::{Deserialize, Serialize};

use super::defaults;
use crate::entry::CacheTier;

/// Tiered store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Hot tier byte budget; overflow demotes to warm.
    pub hot_budget_bytes: usize,
    /// Warm tier byte budget; overflow demotes to cold.
    pub warm_budget_bytes: usize,
    /// Cold tier byte budget; overflow is deleted.
    pub cold_budget_bytes: usize,
}

impl StoreConfig {
    pub fn budget_for(&self, tier: CacheTier) -> usize {
        match tier {
            CacheTier::Hot => self.hot_budget_bytes,
            CacheTier::Warm => self.warm_budget_bytes,
            CacheTier::Cold => self.cold_budget_bytes,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hot_budget_bytes: defaults::DEFAULT_HOT_BUDGET_BYTES,
            warm_budget_bytes: defaults::DEFAULT_WARM_BUDGET_BYTES,
            cold_budget_bytes: defaults::DEFAULT_COLD_BUDGET_BYTES,
        }
    }
}
