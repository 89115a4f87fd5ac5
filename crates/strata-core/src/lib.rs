//! # strata-core
//!
//! Foundation crate for the strata knowledge resolution engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod entry;
pub mod errors;
pub mod event;
pub mod timeout;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::StrataConfig;
pub use entry::{CacheTier, Content, Entry, EntryKey, Layer, LayerName, RetentionMode};
pub use errors::{StrataError, StrataResult};
pub use event::Event;
pub use timeout::TimeoutTier;
