//! Engine configuration. Supplied once at startup by the host; static for the
//! process lifetime. Reload means teardown and reconstruction, never live
//! mutation mid-request.

pub mod defaults;

mod executor_config;
mod store_config;

pub use executor_config::{BreakerConfig, ExecutorConfig, RetryConfig, TierBounds};
pub use store_config::StoreConfig;

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::entry::{Layer, RetentionMode, RetentionPolicy};
use crate::errors::ConfigError;
use crate::timeout::TimeoutTier;

/// One configured layer. Rank is total and static; lower rank wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    pub name: String,
    pub rank: u32,
    /// Advisory soft ceiling.
    #[serde(default)]
    pub budget_bytes: Option<usize>,
}

impl From<&LayerConfig> for Layer {
    fn from(cfg: &LayerConfig) -> Self {
        Layer {
            name: cfg.name.as_str().into(),
            rank: cfg.rank,
            budget_bytes: cfg.budget_bytes,
        }
    }
}

/// TOML-friendly retention rule; converts into a `RetentionPolicy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionRule {
    /// Exact key or trailing-wildcard pattern.
    pub pattern: String,
    #[serde(default)]
    pub max_age_secs: Option<u64>,
    #[serde(default)]
    pub max_count: Option<usize>,
    pub mode: RetentionMode,
}

impl From<&RetentionRule> for RetentionPolicy {
    fn from(rule: &RetentionRule) -> Self {
        RetentionPolicy {
            pattern: rule.pattern.clone(),
            max_age: rule.max_age_secs.map(Duration::from_secs),
            max_count: rule.max_count,
            mode: rule.mode,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// Ordered layer list. Must be non-empty with unique names and ranks.
    pub layers: Vec<LayerConfig>,
    pub store: StoreConfig,
    pub executor: ExecutorConfig,
    /// Retention policy table, matched in order; first match wins.
    pub retention: Vec<RetentionRule>,
    /// Timeout tier per operation class. Unlisted classes get `Standard`.
    pub operations: HashMap<String, TimeoutTier>,
    /// Static fallback values by key, the last degradation stage before error.
    pub fallback_defaults: HashMap<String, String>,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            layers: vec![
                LayerConfig {
                    name: "project".into(),
                    rank: 1,
                    budget_bytes: None,
                },
                LayerConfig {
                    name: "universal".into(),
                    rank: 2,
                    budget_bytes: None,
                },
            ],
            store: StoreConfig::default(),
            executor: ExecutorConfig::default(),
            retention: Vec::new(),
            operations: HashMap::new(),
            fallback_defaults: HashMap::new(),
        }
    }
}

impl StrataConfig {
    /// Parse from a TOML document. Validation is separate and runs at
    /// engine construction.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Tier assigned to an operation class, `Standard` when unlisted.
    pub fn tier_for(&self, op_class: &str) -> TimeoutTier {
        self.operations
            .get(op_class)
            .copied()
            .unwrap_or(TimeoutTier::Standard)
    }

    /// Layers sorted best rank first.
    pub fn ordered_layers(&self) -> Vec<Layer> {
        let mut layers: Vec<Layer> = self.layers.iter().map(Layer::from).collect();
        layers.sort_by_key(|l| l.rank);
        layers
    }

    /// Retention policies in table order.
    pub fn retention_policies(&self) -> Vec<RetentionPolicy> {
        self.retention.iter().map(RetentionPolicy::from).collect()
    }

    /// Startup validation. Any violation is fatal: the engine must not enter
    /// service on malformed layers, thresholds, or tier bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layers.is_empty() {
            return Err(ConfigError::NoLayers);
        }

        let mut seen_names = HashMap::new();
        let mut seen_ranks: HashMap<u32, &str> = HashMap::new();
        for layer in &self.layers {
            if seen_names.insert(layer.name.as_str(), ()).is_some() {
                return Err(ConfigError::DuplicateLayerName {
                    name: layer.name.clone(),
                });
            }
            if let Some(first) = seen_ranks.insert(layer.rank, layer.name.as_str()) {
                return Err(ConfigError::DuplicateLayerRank {
                    rank: layer.rank,
                    first: first.to_string(),
                    second: layer.name.clone(),
                });
            }
        }

        if self.executor.breaker.failure_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "executor.breaker.failure_threshold",
                reason: "must be at least 1".into(),
            });
        }
        if self.executor.breaker.reset_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "executor.breaker.reset_timeout_ms",
                reason: "must be non-zero".into(),
            });
        }
        if self.executor.breaker.half_open_max_probes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "executor.breaker.half_open_max_probes",
                reason: "must admit at least one probe".into(),
            });
        }

        for tier in TimeoutTier::ladder() {
            if self.executor.tier_bounds.bound_ms(tier) == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "executor.tier_bounds",
                    reason: format!("tier {tier} has a zero bound"),
                });
            }
        }

        for rule in &self.retention {
            if rule.max_age_secs.is_none() && rule.max_count.is_none() {
                return Err(ConfigError::InvalidValue {
                    field: "retention",
                    reason: format!("rule {} configures no constraint", rule.pattern),
                });
            }
        }

        Ok(())
    }
}
