use std::sync::{Arc, RwLock};

use strata_core::errors::{PluginError, StrataResult};
use tracing::{debug, trace};

use crate::hook::{HookContext, HookFlow, HookPoint};
use crate::registration::{Plugin, PluginRegistration};

/// Result of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookOutcome {
    /// How many plugins actually ran.
    pub invoked: usize,
    /// A pre-hook ended the pipeline early; the context holds the final value.
    pub short_circuited: bool,
}

/// Ordered chain of registered plugins, invoked per hook point in ascending
/// priority (registration order breaks ties). A plugin error aborts the
/// remaining chain for that invocation and surfaces to the caller; it is
/// never retried here.
#[derive(Default)]
pub struct PluginPipeline {
    registrations: RwLock<Vec<PluginRegistration>>,
}

impl PluginPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, checking the kind's capability contract: every
    /// requested hook point must be allowed for the plugin's kind.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> StrataResult<()> {
        let kind = plugin.kind();
        let hook_points = plugin.hook_points();
        for hook in &hook_points {
            if !kind.allowed_hooks().contains(hook) {
                return Err(PluginError::CapabilityMismatch {
                    plugin: plugin.name().to_string(),
                    kind: kind.as_str().to_string(),
                    hook: hook.to_string(),
                }
                .into());
            }
        }

        let mut registrations = self.registrations.write().unwrap();
        if registrations.iter().any(|r| r.name() == plugin.name()) {
            return Err(PluginError::DuplicateName {
                plugin: plugin.name().to_string(),
            }
            .into());
        }

        debug!(plugin = plugin.name(), kind = kind.as_str(), "plugin registered");
        let order = registrations.len() as u64;
        registrations.push(PluginRegistration {
            priority: plugin.priority(),
            hook_points,
            plugin,
            enabled: true,
            order,
        });
        Ok(())
    }

    /// Enable or disable a plugin without unregistering it. Returns false if
    /// no such plugin exists.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut registrations = self.registrations.write().unwrap();
        match registrations.iter_mut().find(|r| r.name() == name) {
            Some(reg) => {
                reg.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn plugin_count(&self) -> usize {
        self.registrations.read().unwrap().len()
    }

    /// Run every enabled plugin registered for `hook`, in ascending priority.
    ///
    /// A `ShortCircuit` from a pre-hook ends the pipeline with the context as
    /// the final value; from any other hook it is a contract violation. Any
    /// plugin error aborts the remaining chain.
    pub fn invoke(
        &self,
        hook: HookPoint,
        ctx: &mut HookContext,
    ) -> Result<HookOutcome, PluginError> {
        let chain: Vec<(Arc<dyn Plugin>, u32)> = {
            let registrations = self.registrations.read().unwrap();
            let mut chain: Vec<(&PluginRegistration, u64)> = registrations
                .iter()
                .filter(|r| r.enabled && r.handles(hook))
                .map(|r| (r, r.order))
                .collect();
            chain.sort_by_key(|(r, order)| (r.priority, *order));
            chain
                .into_iter()
                .map(|(r, _)| (r.plugin.clone(), r.priority))
                .collect()
        };

        let mut invoked = 0;
        for (plugin, priority) in chain {
            trace!(hook = %hook, plugin = plugin.name(), priority, "invoking hook");
            match plugin.on_hook(hook, ctx)? {
                HookFlow::Continue => invoked += 1,
                HookFlow::ShortCircuit => {
                    invoked += 1;
                    if !hook.allows_short_circuit() {
                        return Err(PluginError::IllegalShortCircuit {
                            plugin: plugin.name().to_string(),
                            hook: hook.to_string(),
                        });
                    }
                    debug!(hook = %hook, plugin = plugin.name(), "pipeline short-circuited");
                    return Ok(HookOutcome {
                        invoked,
                        short_circuited: true,
                    });
                }
            }
        }
        Ok(HookOutcome {
            invoked,
            short_circuited: false,
        })
    }
}
