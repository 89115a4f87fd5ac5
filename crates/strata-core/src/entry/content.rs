use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entry payload. Serialized as a tagged enum so the kind is preserved in JSON.
///
/// `Text` is opaque: a higher layer replaces it wholesale. `Structured` is a
/// set of named fields and supports partial cross-layer merge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Structured(Map<String, Value>),
}

impl Content {
    /// Build structured content from field pairs.
    pub fn structured<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::Structured(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Whether this content supports partial merge across layers.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Approximate payload size used for tier budgets and eviction tiebreaks.
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Structured(map) => {
                // Serialized length; falls back to key/value byte sum if a
                // field cannot be serialized (non-finite floats).
                serde_json::to_string(map)
                    .map(|s| s.len())
                    .unwrap_or_else(|_| map.iter().map(|(k, v)| k.len() + v.to_string().len()).sum())
            }
        }
    }

    /// Lowercased text used for substring search.
    pub fn search_text(&self) -> String {
        match self {
            Self::Text(text) => text.to_lowercase(),
            Self::Structured(map) => serde_json::to_string(map)
                .unwrap_or_default()
                .to_lowercase(),
        }
    }

    /// Render as a plain string for the boundary layer.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(map) => {
                serde_json::to_string(map).unwrap_or_else(|_| String::from("{}"))
            }
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
