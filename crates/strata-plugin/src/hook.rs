use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_core::entry::{Content, LayerName};

/// The fixed set of extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookPoint {
    PreLoad,
    PostLoad,
    OnTimeout,
    PreSearch,
    PostSearch,
    OnStartup,
    OnShutdown,
    OnError,
    OnCacheHit,
    OnCacheMiss,
}

impl HookPoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PreLoad => "pre-load",
            Self::PostLoad => "post-load",
            Self::OnTimeout => "on-timeout",
            Self::PreSearch => "pre-search",
            Self::PostSearch => "post-search",
            Self::OnStartup => "on-startup",
            Self::OnShutdown => "on-shutdown",
            Self::OnError => "on-error",
            Self::OnCacheHit => "on-cache-hit",
            Self::OnCacheMiss => "on-cache-miss",
        }
    }

    /// Pre-hooks may short-circuit the pipeline; every other hook may only
    /// observe or transform.
    pub fn allows_short_circuit(self) -> bool {
        matches!(self, Self::PreLoad | Self::PreSearch)
    }

    pub fn all() -> [Self; 10] {
        [
            Self::PreLoad,
            Self::PostLoad,
            Self::OnTimeout,
            Self::PreSearch,
            Self::PostSearch,
            Self::OnStartup,
            Self::OnShutdown,
            Self::OnError,
            Self::OnCacheHit,
            Self::OnCacheMiss,
        ]
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a hook tells the pipeline to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookFlow {
    Continue,
    /// End the pipeline now; the context carries the final value. Only legal
    /// from pre-hooks.
    ShortCircuit,
}

/// Mutable context threaded through a pipeline invocation. Hooks transform
/// it in place; the slots a stage populates depend on the hook point.
#[derive(Debug, Default, Clone)]
pub struct HookContext {
    pub layer: Option<LayerName>,
    pub key: Option<String>,
    /// Content in flight: the loader result for post-load, the candidate
    /// value for a short-circuiting pre-load, and so on.
    pub content: Option<Content>,
    /// Free-form side channel between plugins.
    pub values: HashMap<String, Value>,
}

impl HookContext {
    pub fn for_key(layer: Option<LayerName>, key: impl Into<String>) -> Self {
        Self {
            layer,
            key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }
}
