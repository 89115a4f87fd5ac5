//! Cross-layer content merge.
//!
//! Opaque text overrides totally: the best-ranked entry wins as-is.
//! Structured content merges shallowly: fields present in a higher layer win,
//! fields present only in lower layers are retained. The merge is restricted
//! to structured entries by policy; text entries never participate.

use serde_json::Map;
use strata_core::entry::{Content, Entry};

/// Merge resolved entries, ordered best rank first. The slice is non-empty.
pub(crate) fn merged_content(entries: &[Entry]) -> Content {
    let top = &entries[0];
    if !top.content.is_structured() {
        return top.content.clone();
    }

    // Overlay from worst rank to best so better-ranked fields land last.
    let mut fields = Map::new();
    for entry in entries.iter().rev() {
        if let Content::Structured(map) = &entry.content {
            for (key, value) in map {
                fields.insert(key.clone(), value.clone());
            }
        }
    }
    Content::Structured(fields)
}
