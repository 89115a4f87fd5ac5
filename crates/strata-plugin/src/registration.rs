use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_core::constants::DEFAULT_PLUGIN_PRIORITY;
use strata_core::errors::PluginError;

use crate::hook::{HookContext, HookFlow, HookPoint};

/// Capability contract: the kind fixes which hook points a plugin may
/// handle. Checked once at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginKind {
    Loader,
    Search,
    Lifecycle,
    Error,
    Cache,
}

impl PluginKind {
    pub fn allowed_hooks(self) -> &'static [HookPoint] {
        match self {
            Self::Loader => &[HookPoint::PreLoad, HookPoint::PostLoad],
            Self::Search => &[HookPoint::PreSearch, HookPoint::PostSearch],
            Self::Lifecycle => &[HookPoint::OnStartup, HookPoint::OnShutdown],
            Self::Error => &[HookPoint::OnError, HookPoint::OnTimeout],
            Self::Cache => &[HookPoint::OnCacheHit, HookPoint::OnCacheMiss],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loader => "loader",
            Self::Search => "search",
            Self::Lifecycle => "lifecycle",
            Self::Error => "error",
            Self::Cache => "cache",
        }
    }
}

/// Extension implementation. One plugin handles one kind's hook points;
/// `priority` orders it within each hook's pipeline (lower runs earlier).
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> PluginKind;

    /// The hook points this plugin wants. Must be a subset of
    /// `kind().allowed_hooks()`; registration rejects anything else.
    fn hook_points(&self) -> Vec<HookPoint>;

    fn priority(&self) -> u32 {
        DEFAULT_PLUGIN_PRIORITY
    }

    fn on_hook(&self, hook: HookPoint, ctx: &mut HookContext) -> Result<HookFlow, PluginError>;
}

/// A registered plugin. Disabling skips it during invocation but keeps the
/// registration in place.
pub struct PluginRegistration {
    pub plugin: Arc<dyn Plugin>,
    pub hook_points: Vec<HookPoint>,
    pub priority: u32,
    pub enabled: bool,
    /// Registration order, the tiebreak for equal priorities.
    pub(crate) order: u64,
}

impl PluginRegistration {
    pub fn name(&self) -> &str {
        self.plugin.name()
    }

    pub fn handles(&self, hook: HookPoint) -> bool {
        self.hook_points.contains(&hook)
    }
}
