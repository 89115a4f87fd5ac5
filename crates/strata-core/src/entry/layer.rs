use serde::{Deserialize, Serialize};

/// Name of a layer, e.g. `project`, `universal`, `user`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerName(pub String);

impl LayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// A priority-ranked namespace of entries.
///
/// Rank order is total and static for the engine lifetime; lower rank wins.
/// A higher-ranked layer overrides lower ones for identical keys but never
/// deletes lower-layer entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: LayerName,
    /// Strictly ordered, no ties. Lower rank = higher precedence.
    pub rank: u32,
    /// Soft size ceiling, advisory only.
    pub budget_bytes: Option<usize>,
}

impl Layer {
    pub fn new(name: impl Into<String>, rank: u32) -> Self {
        Self {
            name: LayerName::new(name),
            rank,
            budget_bytes: None,
        }
    }

    pub fn with_budget(mut self, budget_bytes: usize) -> Self {
        self.budget_bytes = Some(budget_bytes);
        self
    }
}
