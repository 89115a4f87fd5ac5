//! Lifecycle events. Immutable once published; delivery is the bus's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A single lifecycle event, e.g. `load.started` or `search.failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    /// Dotted type tag: `<operation>.<phase>`.
    pub event_type: String,
    pub payload: Map<String, Value>,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            payload: Map::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// The `<operation>` part of the type tag.
    pub fn operation(&self) -> &str {
        self.event_type
            .split_once('.')
            .map(|(op, _)| op)
            .unwrap_or(&self.event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_is_prefix_of_type_tag() {
        let event = Event::new("load.started");
        assert_eq!(event.operation(), "load");
    }

    #[test]
    fn fields_land_in_payload() {
        let event = Event::new("load.completed")
            .with_field("key", "timeout.default")
            .with_field("source", "primary");
        assert_eq!(event.payload["key"], "timeout.default");
        assert_eq!(event.payload["source"], "primary");
    }
}
