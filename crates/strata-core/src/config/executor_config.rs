use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::timeout::TimeoutTier;

/// Per-tier bound overrides, in milliseconds. Zero is rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierBounds {
    pub instant_ms: u64,
    pub fast_ms: u64,
    pub standard_ms: u64,
    pub slow_ms: u64,
    pub expensive_ms: u64,
}

impl TierBounds {
    pub fn bound_ms(&self, tier: TimeoutTier) -> u64 {
        match tier {
            TimeoutTier::Instant => self.instant_ms,
            TimeoutTier::Fast => self.fast_ms,
            TimeoutTier::Standard => self.standard_ms,
            TimeoutTier::Slow => self.slow_ms,
            TimeoutTier::Expensive => self.expensive_ms,
        }
    }

    pub fn bound(&self, tier: TimeoutTier) -> Duration {
        Duration::from_millis(self.bound_ms(tier))
    }
}

impl Default for TierBounds {
    fn default() -> Self {
        Self {
            instant_ms: TimeoutTier::Instant.nominal_bound_ms(),
            fast_ms: TimeoutTier::Fast.nominal_bound_ms(),
            standard_ms: TimeoutTier::Standard.nominal_bound_ms(),
            slow_ms: TimeoutTier::Slow.nominal_bound_ms(),
            expensive_ms: TimeoutTier::Expensive.nominal_bound_ms(),
        }
    }
}

/// Circuit breaker tuning, shared by every operation class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures in the closed state that open the circuit.
    pub failure_threshold: u32,
    /// How long the circuit stays open before admitting probes.
    pub reset_timeout_ms: u64,
    /// Probe calls admitted while half-open.
    pub half_open_max_probes: u32,
}

impl BreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: defaults::DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_ms: defaults::DEFAULT_RESET_TIMEOUT_MS,
            half_open_max_probes: defaults::DEFAULT_HALF_OPEN_MAX_PROBES,
        }
    }
}

/// Backoff tuning for explicitly idempotent operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::DEFAULT_RETRY_MAX_ATTEMPTS,
            base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            max_delay_ms: defaults::DEFAULT_RETRY_MAX_DELAY_MS,
            multiplier: defaults::DEFAULT_RETRY_MULTIPLIER,
            jitter: true,
        }
    }
}

/// Executor configuration: the timeout ladder plus breaker and retry tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub tier_bounds: TierBounds,
    pub breaker: BreakerConfig,
    pub retry: RetryConfig,
}
