use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::Content;
use super::layer::LayerName;
use super::tier::CacheTier;
use crate::constants::DEFAULT_ENTRY_PRIORITY;

/// Identity of an entry: exactly one authoritative entry exists per
/// `(layer, key)`. Cross-layer precedence for identical keys is the
/// resolver's business, never the store's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub layer: LayerName,
    pub key: String,
}

impl EntryKey {
    pub fn new(layer: impl Into<LayerName>, key: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for EntryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.layer, self.key)
    }
}

impl From<(&str, &str)> for EntryKey {
    fn from((layer, key): (&str, &str)) -> Self {
        Self::new(layer, key)
    }
}

/// A named unit of content, owned exclusively by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Unique within its layer.
    pub key: String,
    /// The layer namespace this entry belongs to.
    pub layer: LayerName,
    /// Payload; structured content supports cross-layer merge.
    pub content: Content,
    /// Eviction weight, higher survives longer. Default 50.
    pub priority: u32,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Current cache tier placement.
    pub tier: CacheTier,
    pub size_bytes: usize,
    /// Temporary entries are the first eviction candidates.
    pub temporary: bool,
    /// blake3 hash of the serialized content, for dedup and change detection.
    pub content_hash: String,
}

impl Entry {
    /// Build a fresh entry. New entries start in the hot tier.
    pub fn new(layer: impl Into<LayerName>, key: impl Into<String>, content: Content) -> Self {
        let now = Utc::now();
        let size_bytes = content.size_bytes();
        let content_hash = Self::compute_content_hash(&content);
        Self {
            key: key.into(),
            layer: layer.into(),
            content,
            priority: DEFAULT_ENTRY_PRIORITY,
            created_at: now,
            last_accessed: now,
            tier: CacheTier::Hot,
            size_bytes,
            temporary: false,
            content_hash,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn entry_key(&self) -> EntryKey {
        EntryKey {
            layer: self.layer.clone(),
            key: self.key.clone(),
        }
    }

    /// blake3 over the tagged-JSON encoding of the content.
    pub fn compute_content_hash(content: &Content) -> String {
        let serialized = serde_json::to_string(content).unwrap_or_default();
        blake3::hash(serialized.as_bytes()).to_hex().to_string()
    }

    /// Age relative to `now`, zero if the clock went backwards.
    pub fn age(&self, now: DateTime<Utc>) -> std::time::Duration {
        (now - self.created_at).to_std().unwrap_or_default()
    }
}

/// Identity equality: same `(layer, key)`. Content comparison goes through
/// `content_hash`.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.layer == other.layer && self.key == other.key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entry_starts_hot_with_default_priority() {
        let entry = Entry::new("project", "timeout.default", Content::from("2000"));
        assert_eq!(entry.tier, CacheTier::Hot);
        assert_eq!(entry.priority, DEFAULT_ENTRY_PRIORITY);
        assert_eq!(entry.size_bytes, 4);
        assert!(!entry.temporary);
    }

    #[test]
    fn content_hash_tracks_content() {
        let a = Entry::new("project", "k", Content::from("one"));
        let b = Entry::new("project", "k", Content::from("one"));
        let c = Entry::new("project", "k", Content::from("two"));
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash);
    }

    #[test]
    fn identity_equality_ignores_content() {
        let a = Entry::new("project", "k", Content::from("one"));
        let b = Entry::new("project", "k", Content::from("two"));
        assert_eq!(a, b);
    }
}
