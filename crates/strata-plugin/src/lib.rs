//! # strata-plugin
//!
//! Extension points around the engine's stages. Plugins declare a kind
//! (loader, search, lifecycle, error, cache) whose capability contract fixes
//! the hook points they may handle; the contract is checked once at
//! registration, never at call time. Pipelines run in ascending priority;
//! pre-hooks may short-circuit, post-hooks may only transform.

mod hook;
mod pipeline;
mod registration;

pub use hook::{HookContext, HookFlow, HookPoint};
pub use pipeline::{HookOutcome, PluginPipeline};
pub use registration::{Plugin, PluginKind, PluginRegistration};
