use serde::{Deserialize, Serialize};

/// Cache tier placement. Distinct from the executor's timeout tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    Hot,
    Warm,
    Cold,
}

impl CacheTier {
    /// One step up, saturating at `Hot`.
    pub fn promoted(self) -> Self {
        match self {
            Self::Hot | Self::Warm => Self::Hot,
            Self::Cold => Self::Warm,
        }
    }

    /// One step down, or `None` when there is nowhere left to demote.
    pub fn demoted(self) -> Option<Self> {
        match self {
            Self::Hot => Some(Self::Warm),
            Self::Warm => Some(Self::Cold),
            Self::Cold => None,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Hot, Self::Warm, Self::Cold]
    }
}

impl std::fmt::Display for CacheTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hot => write!(f, "hot"),
            Self::Warm => write!(f, "warm"),
            Self::Cold => write!(f, "cold"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_saturates_at_hot() {
        assert_eq!(CacheTier::Hot.promoted(), CacheTier::Hot);
        assert_eq!(CacheTier::Cold.promoted(), CacheTier::Warm);
    }

    #[test]
    fn demote_bottoms_out_at_cold() {
        assert_eq!(CacheTier::Hot.demoted(), Some(CacheTier::Warm));
        assert_eq!(CacheTier::Cold.demoted(), None);
    }
}
