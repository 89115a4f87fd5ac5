//! The fixed five-level timeout ladder.
//!
//! Each operation class is bound to exactly one tier by configuration; the
//! engine never infers a tier. Nominal bounds are defaults, overridable via
//! `ExecutorConfig`.

use serde::{Deserialize, Serialize};

/// One rung of the timeout ladder, ascending from cache-like lookups to
/// expensive multi-source operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutTier {
    /// ~100ms: cache-like operations.
    Instant,
    /// ~500ms: single-source lookups.
    Fast,
    /// ~2s: loads that may touch durable storage.
    Standard,
    /// ~5s: scans over many entries.
    Slow,
    /// ~10s: expensive multi-source operations.
    Expensive,
}

impl TimeoutTier {
    /// Default bound in milliseconds; `ExecutorConfig` may override.
    pub fn nominal_bound_ms(self) -> u64 {
        match self {
            Self::Instant => 100,
            Self::Fast => 500,
            Self::Standard => 2_000,
            Self::Slow => 5_000,
            Self::Expensive => 10_000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "instant",
            Self::Fast => "fast",
            Self::Standard => "standard",
            Self::Slow => "slow",
            Self::Expensive => "expensive",
        }
    }

    pub fn ladder() -> [Self; 5] {
        [
            Self::Instant,
            Self::Fast,
            Self::Standard,
            Self::Slow,
            Self::Expensive,
        ]
    }
}

impl std::fmt::Display for TimeoutTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_is_strictly_ascending() {
        let bounds: Vec<u64> = TimeoutTier::ladder()
            .iter()
            .map(|t| t.nominal_bound_ms())
            .collect();
        assert!(bounds.windows(2).all(|w| w[0] < w[1]));
    }
}
