//! Property tests for eviction ordering through the public store API.

use proptest::prelude::*;
use strata_core::config::StoreConfig;
use strata_core::entry::{CacheTier, Content, Entry, RetentionPolicy};
use strata_store::TieredStore;

fn store(hot_budget: usize) -> TieredStore {
    TieredStore::new(
        StoreConfig {
            hot_budget_bytes: hot_budget,
            warm_budget_bytes: usize::MAX / 4,
            cold_budget_bytes: usize::MAX / 4,
        },
        Vec::new(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Every entry demoted out of the hot tier has priority no greater than
    // any entry left in it.
    #[test]
    fn demotion_respects_priority(priorities in prop::collection::vec(0u32..100, 2..20)) {
        const SIZE: usize = 16;
        // Budget fits roughly half the entries.
        let st = store(SIZE * priorities.len() / 2 + 1);

        for (i, priority) in priorities.iter().enumerate() {
            let entry = Entry::new("project", format!("k{i}"), Content::Text("x".repeat(SIZE)))
                .with_priority(*priority);
            st.put(entry).unwrap();
        }

        let entries = st.snapshot(None);
        let max_demoted = entries
            .iter()
            .filter(|e| e.tier != CacheTier::Hot)
            .map(|e| e.priority)
            .max();
        let min_hot = entries
            .iter()
            .filter(|e| e.tier == CacheTier::Hot)
            .map(|e| e.priority)
            .min();

        if let (Some(demoted), Some(hot)) = (max_demoted, min_hot) {
            prop_assert!(demoted <= hot);
        }
    }

    // The retention sweep never deletes an entry inside its count window.
    #[test]
    fn sweep_never_removes_within_count_window(extra in 0usize..8, max_count in 1usize..5) {
        let policies = vec![RetentionPolicy::count_based("item.*", max_count)];
        let st = TieredStore::new(StoreConfig::default(), policies);

        let total = max_count + extra;
        for i in 0..total {
            let entry = Entry::new("project", format!("item.{i:02}"), Content::from("v"));
            st.put(entry).unwrap();
            // Distinct creation times keep the newest-first ranking stable.
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let remaining = st.snapshot(None);
        prop_assert_eq!(remaining.len(), max_count.min(total));
        // The survivors are exactly the newest ones.
        for entry in &remaining {
            let idx: usize = entry.key.trim_start_matches("item.").parse().unwrap();
            prop_assert!(idx >= total - max_count.min(total));
        }
    }
}
