//! Per-key load serialization.
//!
//! A cache miss triggers an external load; concurrent misses for the same
//! `(layer, key)` must share one load rather than stampede the loader. The
//! gate hands out one async mutex per key: the first caller loads and stores,
//! later callers wake up, re-check the store, and hit.

use std::sync::Arc;

use dashmap::DashMap;
use strata_core::entry::EntryKey;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SlotMap = Arc<DashMap<EntryKey, Arc<Mutex<()>>>>;

/// Handed back by [`LoadGate::lock`]; holding it means this caller owns the
/// in-flight load for the key. Dropping the permit releases the slot and
/// removes it from the gate once nobody else is waiting, so an abandoned
/// load (a future dropped mid-flight) cannot leak its slot.
pub struct LoadPermit {
    guard: Option<OwnedMutexGuard<()>>,
    locks: SlotMap,
    key: EntryKey,
}

impl Drop for LoadPermit {
    fn drop(&mut self) {
        // Release the mutex before checking the refcount, or the guard's own
        // handle keeps the slot alive.
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) <= 1);
    }
}

#[derive(Default)]
pub struct LoadGate {
    locks: SlotMap,
}

impl LoadGate {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Wait for the key's slot. Exactly one permit exists per key at a time.
    pub async fn lock(&self, key: &EntryKey) -> LoadPermit {
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        LoadPermit {
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
            key: key.clone(),
        }
    }

    /// Drop every slot with no holder and no waiters. Permits clean up after
    /// themselves; this catches slots orphaned by callers cancelled before
    /// they acquired a permit. Run from periodic maintenance.
    pub fn sweep(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.locks.len()
    }

    #[cfg(test)]
    fn insert_idle_slot(&self, key: &EntryKey) {
        self.locks.insert(key.clone(), Arc::new(Mutex::new(())));
    }
}
