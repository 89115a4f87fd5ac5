//! Error taxonomy. Each subsystem owns its enum; `StrataError` rolls them up.
//!
//! `NotFound` and `Timeout` are recoverable through the fallback chain;
//! `CircuitOpen` recovers only via the breaker's reset timer; plugin and
//! configuration errors always surface.

mod config_error;
mod execute_error;
mod plugin_error;
mod resolve_error;
mod store_error;

pub use config_error::ConfigError;
pub use execute_error::{ExecuteError, FailureKind, FallbackStage};
pub use plugin_error::PluginError;
pub use resolve_error::ResolveError;
pub use store_error::StoreError;

/// Top-level error for the strata engine.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("loader error for {layer}/{key}: {reason}")]
    Loader {
        layer: String,
        key: String,
        reason: String,
    },
}

impl StrataError {
    /// Whether the fallback chain may resolve this error locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Resolve(ResolveError::NotFound { .. })
                | Self::Resolve(ResolveError::NotFoundInLayer { .. })
                | Self::Execute(ExecuteError::Timeout { .. })
                | Self::Execute(ExecuteError::CircuitOpen { .. })
                | Self::Loader { .. }
        )
    }

    /// Coarse classification used in terminal events and fallback reporting.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Resolve(ResolveError::NotFound { .. })
            | Self::Resolve(ResolveError::NotFoundInLayer { .. }) => FailureKind::NotFound,
            Self::Execute(ExecuteError::Timeout { .. }) => FailureKind::Timeout,
            Self::Execute(ExecuteError::CircuitOpen { .. }) => FailureKind::CircuitOpen,
            Self::Plugin(_) => FailureKind::Plugin,
            Self::Config(_) => FailureKind::Configuration,
            _ => FailureKind::Other,
        }
    }
}

pub type StrataResult<T> = Result<T, StrataError>;
