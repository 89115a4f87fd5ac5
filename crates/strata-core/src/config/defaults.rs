//! Named defaults for every tunable. These are configuration defaults, not
//! hard-coded invariants; all are overridable through the config.

/// Hot tier byte budget.
pub const DEFAULT_HOT_BUDGET_BYTES: usize = 256 * 1024;

/// Warm tier byte budget.
pub const DEFAULT_WARM_BUDGET_BYTES: usize = 1024 * 1024;

/// Cold tier byte budget. Overflow past this is deleted.
pub const DEFAULT_COLD_BUDGET_BYTES: usize = 4 * 1024 * 1024;

/// Consecutive failures that trip a circuit breaker.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// How long an open circuit waits before allowing half-open probes.
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 30_000;

/// Probe calls admitted while half-open.
pub const DEFAULT_HALF_OPEN_MAX_PROBES: u32 = 1;

/// Bounded retry attempts for idempotent operations.
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;

/// First retry delay.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 50;

/// Retry delay ceiling.
pub const DEFAULT_RETRY_MAX_DELAY_MS: u64 = 2_000;

/// Exponential backoff multiplier.
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;
