//! Eviction candidate ordering.
//!
//! When a tier is over budget, candidates leave in this fixed order:
//! temporary entries, then entries past their max_age, then lowest priority,
//! then least-recently-accessed, then largest size. Remaining ties break by
//! insertion order, oldest first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Sort view over a stored entry; smaller sorts first (evicted first).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub temporary: bool,
    /// Past the max_age of its matching retention policy.
    pub expired: bool,
    pub priority: u32,
    pub last_accessed: DateTime<Utc>,
    pub size_bytes: usize,
    pub seq: u64,
}

pub(crate) fn eviction_cmp(a: &Candidate, b: &Candidate) -> Ordering {
    b.temporary
        .cmp(&a.temporary)
        .then(b.expired.cmp(&a.expired))
        .then(a.priority.cmp(&b.priority))
        .then(a.last_accessed.cmp(&b.last_accessed))
        .then(b.size_bytes.cmp(&a.size_bytes))
        .then(a.seq.cmp(&b.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate(seq: u64) -> Candidate {
        Candidate {
            temporary: false,
            expired: false,
            priority: 50,
            last_accessed: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            size_bytes: 100,
            seq,
        }
    }

    #[test]
    fn temporary_goes_before_everything() {
        let a = Candidate {
            temporary: true,
            priority: 99,
            ..candidate(5)
        };
        let b = Candidate {
            priority: 1,
            ..candidate(1)
        };
        assert_eq!(eviction_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn expired_goes_before_low_priority() {
        let a = Candidate {
            expired: true,
            priority: 99,
            ..candidate(5)
        };
        let b = Candidate {
            priority: 1,
            ..candidate(1)
        };
        assert_eq!(eviction_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn lower_priority_evicts_first() {
        let a = Candidate {
            priority: 10,
            ..candidate(2)
        };
        let b = Candidate {
            priority: 20,
            ..candidate(1)
        };
        assert_eq!(eviction_cmp(&a, &b), Ordering::Less);
    }

    #[test]
    fn lru_breaks_priority_ties() {
        let older = Candidate {
            last_accessed: Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            ..candidate(2)
        };
        let newer = candidate(1);
        assert_eq!(eviction_cmp(&older, &newer), Ordering::Less);
    }

    #[test]
    fn size_breaks_lru_ties_largest_first() {
        let big = Candidate {
            size_bytes: 1_000,
            ..candidate(2)
        };
        let small = candidate(1);
        assert_eq!(eviction_cmp(&big, &small), Ordering::Less);
    }

    #[test]
    fn insertion_order_is_the_final_tiebreak() {
        let first = candidate(1);
        let second = candidate(2);
        assert_eq!(eviction_cmp(&first, &second), Ordering::Less);
    }
}
