use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strata_core::config::StoreConfig;
use strata_core::entry::{CacheTier, Entry, EntryKey, LayerName, RetentionPolicy};
use strata_core::errors::{StoreError, StrataResult};
use tracing::{debug, trace};

use crate::eviction::{eviction_cmp, Candidate};
use crate::retention;

struct Stored {
    entry: Entry,
    /// Monotonic insertion sequence, the final eviction tiebreak.
    seq: u64,
}

struct Inner {
    entries: HashMap<EntryKey, Stored>,
    next_seq: u64,
}

impl Inner {
    fn tier_bytes(&self, tier: CacheTier) -> usize {
        self.entries
            .values()
            .filter(|s| s.entry.tier == tier)
            .map(|s| s.entry.size_bytes)
            .sum()
    }
}

/// Occupancy of one cache tier.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TierStats {
    pub count: usize,
    pub bytes: usize,
}

/// The tiered cache. Exclusive owner of entry lifecycle: creation, tier
/// placement, and deletion all happen here, atomically with respect to
/// concurrent readers. Lookups never block on I/O.
pub struct TieredStore {
    inner: RwLock<Inner>,
    config: StoreConfig,
    policies: Vec<RetentionPolicy>,
}

impl TieredStore {
    pub fn new(config: StoreConfig, policies: Vec<RetentionPolicy>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            config,
            policies,
        }
    }

    /// Look up an entry, bumping recency. Warm/cold hits are promoted one
    /// tier up unless the target tier is over budget (advisory promotion).
    pub fn get(&self, layer: &LayerName, key: &str) -> Option<Entry> {
        let entry_key = EntryKey {
            layer: layer.clone(),
            key: key.to_string(),
        };
        let mut inner = self.inner.write().unwrap();

        let (target, size) = {
            let stored = inner.entries.get(&entry_key)?;
            let target = stored.entry.tier.promoted();
            (
                (stored.entry.tier != target).then_some(target),
                stored.entry.size_bytes,
            )
        };

        let promote_to = target
            .filter(|&tier| inner.tier_bytes(tier) + size <= self.config.budget_for(tier));

        let stored = inner.entries.get_mut(&entry_key)?;
        stored.entry.last_accessed = Utc::now();
        if let Some(tier) = promote_to {
            trace!(key = %entry_key, %tier, "promoting entry");
            stored.entry.tier = tier;
        }
        Some(stored.entry.clone())
    }

    /// Read without touching recency or tier. Used for stale-cache fallbacks.
    pub fn peek(&self, layer: &LayerName, key: &str) -> Option<Entry> {
        let entry_key = EntryKey {
            layer: layer.clone(),
            key: key.to_string(),
        };
        let inner = self.inner.read().unwrap();
        inner.entries.get(&entry_key).map(|s| s.entry.clone())
    }

    /// Insert or replace. New entries always enter the hot tier; eviction
    /// runs before the lock is released.
    pub fn put(&self, mut entry: Entry) -> StrataResult<()> {
        let largest = self
            .config
            .budget_for(CacheTier::Hot)
            .max(self.config.budget_for(CacheTier::Warm))
            .max(self.config.budget_for(CacheTier::Cold));
        if entry.size_bytes > largest {
            return Err(StoreError::EntryTooLarge {
                layer: entry.layer.to_string(),
                key: entry.key.clone(),
                size_bytes: entry.size_bytes,
            }
            .into());
        }

        entry.tier = CacheTier::Hot;
        let entry_key = entry.entry_key();

        let mut inner = self.inner.write().unwrap();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.entries.insert(entry_key, Stored { entry, seq });
        self.evict_locked(&mut inner);
        Ok(())
    }

    /// Remove one entry. Lower-layer entries for the same key are untouched.
    pub fn delete(&self, layer: &LayerName, key: &str) -> Option<Entry> {
        let entry_key = EntryKey {
            layer: layer.clone(),
            key: key.to_string(),
        };
        let mut inner = self.inner.write().unwrap();
        inner.entries.remove(&entry_key).map(|s| s.entry)
    }

    /// Run the retention sweep and budget rebalance. Called on every put and
    /// by the engine's periodic maintenance trigger.
    pub fn evict_if_needed(&self) {
        let mut inner = self.inner.write().unwrap();
        self.evict_locked(&mut inner);
    }

    /// Stable snapshot for scans: clones sorted by (layer, key).
    pub fn snapshot(&self, layer: Option<&LayerName>) -> Vec<Entry> {
        let inner = self.inner.read().unwrap();
        let mut entries: Vec<Entry> = inner
            .entries
            .values()
            .filter(|s| layer.map_or(true, |l| &s.entry.layer == l))
            .map(|s| s.entry.clone())
            .collect();
        entries.sort_by(|a, b| a.layer.cmp(&b.layer).then_with(|| a.key.cmp(&b.key)));
        entries
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Occupancy per tier, for info/stats.
    pub fn tier_stats(&self) -> HashMap<CacheTier, TierStats> {
        let inner = self.inner.read().unwrap();
        let mut stats: HashMap<CacheTier, TierStats> = CacheTier::all()
            .into_iter()
            .map(|t| (t, TierStats::default()))
            .collect();
        for stored in inner.entries.values() {
            let s = stats.entry(stored.entry.tier).or_default();
            s.count += 1;
            s.bytes += stored.entry.size_bytes;
        }
        stats
    }

    fn evict_locked(&self, inner: &mut Inner) {
        let now = Utc::now();

        // Pass 1: retention violations are deleted outright.
        let eligible = retention::sweep(
            inner.entries.values().map(|s| &s.entry),
            &self.policies,
            now,
        );
        for key in &eligible {
            debug!(key = %key, "retention sweep deleting entry");
            inner.entries.remove(key);
        }

        // Pass 2: budget rebalance, hot demotes to warm, warm to cold,
        // cold overflow is deleted.
        for tier in [CacheTier::Hot, CacheTier::Warm, CacheTier::Cold] {
            let budget = self.config.budget_for(tier);
            while inner.tier_bytes(tier) > budget {
                let Some(victim) = self.select_victim(inner, tier, now) else {
                    break;
                };
                match tier.demoted() {
                    Some(lower) => {
                        trace!(key = %victim, from = %tier, to = %lower, "demoting entry");
                        if let Some(stored) = inner.entries.get_mut(&victim) {
                            stored.entry.tier = lower;
                        }
                    }
                    None => {
                        debug!(key = %victim, "cold tier over budget, deleting entry");
                        inner.entries.remove(&victim);
                    }
                }
            }
        }
    }

    /// Next entry to leave `tier`, per the fixed eviction ordering.
    fn select_victim(&self, inner: &Inner, tier: CacheTier, now: DateTime<Utc>) -> Option<EntryKey> {
        inner
            .entries
            .iter()
            .filter(|(_, s)| s.entry.tier == tier)
            .map(|(key, s)| {
                let expired = retention::matching_policy(&self.policies, &s.entry.key)
                    .and_then(|p| retention::age_violated(&s.entry, p, now))
                    .unwrap_or(false);
                (
                    key.clone(),
                    Candidate {
                        temporary: s.entry.temporary,
                        expired,
                        priority: s.entry.priority,
                        last_accessed: s.entry.last_accessed,
                        size_bytes: s.entry.size_bytes,
                        seq: s.seq,
                    },
                )
            })
            .min_by(|(_, a), (_, b)| eviction_cmp(a, b))
            .map(|(key, _)| key)
    }
}
