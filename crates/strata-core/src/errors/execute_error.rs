use serde::{Deserialize, Serialize};

/// Stage of the degradation ladder a result came from or died at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStage {
    /// A cached value, possibly stale.
    StaleCache,
    /// A configured default/static value.
    DefaultValue,
}

impl std::fmt::Display for FallbackStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleCache => write!(f, "stale_cache"),
            Self::DefaultValue => write!(f, "default_value"),
        }
    }
}

/// Coarse failure classification carried in terminal events and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Timeout,
    CircuitOpen,
    Plugin,
    Configuration,
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Timeout => write!(f, "timeout"),
            Self::CircuitOpen => write!(f, "circuit_open"),
            Self::Plugin => write!(f, "plugin"),
            Self::Configuration => write!(f, "configuration"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Executor errors: bounded-latency discipline and the circuit breaker.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("operation {op_class} exceeded its {tier} bound of {bound_ms}ms")]
    Timeout {
        op_class: String,
        tier: &'static str,
        bound_ms: u64,
    },

    #[error("circuit open for operation class {op_class}")]
    CircuitOpen { op_class: String },

    /// Terminal: primary failed and every fallback stage came up empty.
    /// Carries the kind of the primary failure and the last stage attempted.
    #[error("operation {op_class} exhausted fallbacks after {kind} (last stage: {last_stage:?})")]
    Exhausted {
        op_class: String,
        kind: FailureKind,
        last_stage: Option<FallbackStage>,
    },
}
