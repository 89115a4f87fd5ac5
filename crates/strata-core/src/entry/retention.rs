use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the configured retention constraints combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionMode {
    /// Only `max_age` applies.
    TimeBased,
    /// Only `max_count` applies.
    CountBased,
    /// Violating any configured constraint makes an entry eligible.
    HybridMax,
    /// All configured constraints must be violated.
    HybridMin,
}

/// Retention rule bound to an exact key or a `prefix*` pattern within a layer
/// group. An entry with no matching policy is never retention-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Exact key or trailing-wildcard pattern, e.g. `session.*`.
    pub pattern: String,
    pub max_age: Option<Duration>,
    /// Ceiling on the number of entries in the pattern group; newest kept.
    pub max_count: Option<usize>,
    pub mode: RetentionMode,
}

impl RetentionPolicy {
    pub fn time_based(pattern: impl Into<String>, max_age: Duration) -> Self {
        Self {
            pattern: pattern.into(),
            max_age: Some(max_age),
            max_count: None,
            mode: RetentionMode::TimeBased,
        }
    }

    pub fn count_based(pattern: impl Into<String>, max_count: usize) -> Self {
        Self {
            pattern: pattern.into(),
            max_age: None,
            max_count: Some(max_count),
            mode: RetentionMode::CountBased,
        }
    }

    pub fn hybrid(
        pattern: impl Into<String>,
        max_age: Duration,
        max_count: usize,
        mode: RetentionMode,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            max_age: Some(max_age),
            max_count: Some(max_count),
            mode,
        }
    }

    /// Whether this policy's pattern matches a key.
    pub fn matches(&self, key: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == self.pattern,
        }
    }

    /// Combine per-constraint violation flags into an eviction decision.
    ///
    /// `age_violated`/`count_violated` are `None` when the constraint is not
    /// configured on this policy.
    pub fn eligible(&self, age_violated: Option<bool>, count_violated: Option<bool>) -> bool {
        match self.mode {
            RetentionMode::TimeBased => age_violated.unwrap_or(false),
            RetentionMode::CountBased => count_violated.unwrap_or(false),
            RetentionMode::HybridMax => {
                age_violated.unwrap_or(false) || count_violated.unwrap_or(false)
            }
            RetentionMode::HybridMin => {
                // Unconfigured constraints are neutral: only the configured
                // ones must all be violated.
                age_violated.unwrap_or(true) && count_violated.unwrap_or(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_prefix_patterns() {
        let exact = RetentionPolicy::count_based("session.current", 1);
        assert!(exact.matches("session.current"));
        assert!(!exact.matches("session.current.old"));

        let prefix = RetentionPolicy::count_based("session.*", 5);
        assert!(prefix.matches("session.current"));
        assert!(!prefix.matches("config.timeout"));
    }

    #[test]
    fn hybrid_max_fires_on_any_violation() {
        let policy = RetentionPolicy::hybrid(
            "x",
            Duration::from_secs(60),
            10,
            RetentionMode::HybridMax,
        );
        assert!(policy.eligible(Some(true), Some(false)));
        assert!(policy.eligible(Some(false), Some(true)));
        assert!(!policy.eligible(Some(false), Some(false)));
    }

    #[test]
    fn hybrid_min_requires_all_violations() {
        let policy = RetentionPolicy::hybrid(
            "x",
            Duration::from_secs(60),
            10,
            RetentionMode::HybridMin,
        );
        assert!(!policy.eligible(Some(true), Some(false)));
        assert!(policy.eligible(Some(true), Some(true)));
    }
}
