//! Retention evaluation over the whole entry set.
//!
//! Policies bind by key pattern; the first matching policy in table order
//! governs an entry. Count constraints apply to the pattern group across
//! layers, keeping the newest `max_count` entries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use strata_core::entry::{Entry, EntryKey, RetentionPolicy};

/// First policy whose pattern matches the key, if any.
pub(crate) fn matching_policy<'a>(
    policies: &'a [RetentionPolicy],
    key: &str,
) -> Option<&'a RetentionPolicy> {
    policies.iter().find(|p| p.matches(key))
}

/// Whether the entry is past the policy's max_age. `None` when the policy
/// configures no age constraint.
pub(crate) fn age_violated(
    entry: &Entry,
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> Option<bool> {
    policy.max_age.map(|max_age| entry.age(now) > max_age)
}

/// Keys of entries whose governing policy declares them eligible for cleanup.
pub(crate) fn sweep<'a, I>(
    entries: I,
    policies: &[RetentionPolicy],
    now: DateTime<Utc>,
) -> Vec<EntryKey>
where
    I: Iterator<Item = &'a Entry> + Clone,
{
    if policies.is_empty() {
        return Vec::new();
    }

    // Rank each entry within its pattern group, newest first, so count
    // constraints can flag everything past max_count.
    let mut group_rank: HashMap<EntryKey, usize> = HashMap::new();
    for (idx, policy) in policies.iter().enumerate() {
        if policy.max_count.is_none() {
            continue;
        }
        let mut group: Vec<&Entry> = entries
            .clone()
            .filter(|e| {
                // Only entries governed by this policy (first match wins).
                policies
                    .iter()
                    .position(|p| p.matches(&e.key))
                    .is_some_and(|first| first == idx)
            })
            .collect();
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        for (rank, entry) in group.iter().enumerate() {
            group_rank.insert(entry.entry_key(), rank);
        }
    }

    let mut eligible = Vec::new();
    for entry in entries {
        let Some(policy) = matching_policy(policies, &entry.key) else {
            continue;
        };
        let age = age_violated(entry, policy, now);
        let count = policy.max_count.map(|max| {
            group_rank
                .get(&entry.entry_key())
                .is_some_and(|rank| *rank >= max)
        });
        if policy.eligible(age, count) {
            eligible.push(entry.entry_key());
        }
    }
    eligible
}
