/// Strata engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default entry priority when none is given.
pub const DEFAULT_ENTRY_PRIORITY: u32 = 50;

/// Default plugin priority (lower runs earlier).
pub const DEFAULT_PLUGIN_PRIORITY: u32 = 50;

/// How many entries a search scan examines between deadline checks.
pub const SEARCH_DEADLINE_STRIDE: usize = 64;
