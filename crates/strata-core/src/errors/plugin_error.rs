/// Plugin pipeline errors. Always surfaced, never silently swallowed.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("plugin {plugin} failed at {hook}: {reason}")]
    HookFailed {
        plugin: String,
        hook: String,
        reason: String,
    },

    #[error("plugin {plugin} of kind {kind} may not handle hook {hook}")]
    CapabilityMismatch {
        plugin: String,
        kind: String,
        hook: String,
    },

    #[error("plugin {plugin} is already registered")]
    DuplicateName { plugin: String },

    #[error("post-hook {hook} attempted to short-circuit (plugin {plugin})")]
    IllegalShortCircuit { plugin: String, hook: String },
}
