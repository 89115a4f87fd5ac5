//! Scoped terminal-event emission.
//!
//! Every execute call publishes `{op}.started` when the scope opens and
//! exactly one terminal event when it closes. The Drop impl covers exit
//! paths that never reach an explicit finish: panics and dropped futures
//! still produce a `{op}.failed`.

use std::sync::Arc;

use strata_core::errors::{FailureKind, FallbackStage};
use strata_core::{Event, TimeoutTier};
use strata_events::EventBus;

use crate::executor::OutcomeSource;

pub(crate) struct EventScope {
    bus: Arc<EventBus>,
    op_class: String,
    terminal_sent: bool,
}

impl EventScope {
    pub(crate) fn begin(bus: Arc<EventBus>, op_class: &str, tier: TimeoutTier) -> Self {
        bus.publish(
            &Event::new(format!("{op_class}.started"))
                .with_field("op_class", op_class)
                .with_field("tier", tier.as_str()),
        );
        Self {
            bus,
            op_class: op_class.to_string(),
            terminal_sent: false,
        }
    }

    /// Terminal success, on any path that produced a value: primary result,
    /// stale cache, or default.
    pub(crate) fn completed(mut self, source: OutcomeSource, degraded_by: Option<FailureKind>) {
        let mut event = Event::new(format!("{}.completed", self.op_class))
            .with_field("op_class", self.op_class.as_str())
            .with_field("source", source.as_str());
        if let Some(kind) = degraded_by {
            event = event.with_field("degraded_by", kind.to_string());
        }
        self.bus.publish(&event);
        self.terminal_sent = true;
    }

    /// Terminal failure: the fallback chain is exhausted or the error is not
    /// locally recoverable.
    pub(crate) fn failed(mut self, kind: FailureKind, last_stage: Option<FallbackStage>) {
        let mut event = Event::new(format!("{}.failed", self.op_class))
            .with_field("op_class", self.op_class.as_str())
            .with_field("kind", kind.to_string());
        if let Some(stage) = last_stage {
            event = event.with_field("last_stage", stage.to_string());
        }
        self.bus.publish(&event);
        self.terminal_sent = true;
    }
}

impl Drop for EventScope {
    fn drop(&mut self) {
        if !self.terminal_sent {
            self.bus.publish(
                &Event::new(format!("{}.failed", self.op_class))
                    .with_field("op_class", self.op_class.as_str())
                    .with_field("kind", "abandoned"),
            );
        }
    }
}
