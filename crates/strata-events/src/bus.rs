use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use strata_core::Event;
use tracing::warn;

use crate::pattern::TypePattern;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    pattern: TypePattern,
    handler: Handler,
}

/// Synchronous in-process event bus. Owns no entities, only transient
/// delivery; publishing with zero subscribers is a no-op.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().unwrap().push(Subscriber {
            id,
            pattern: TypePattern::parse(pattern),
            handler: Arc::new(handler),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.write().unwrap();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Deliver to every matching subscriber. A handler error is logged and
    /// never aborts delivery to the rest, nor the publishing operation.
    /// Returns the number of successful deliveries.
    pub fn publish(&self, event: &Event) -> usize {
        // Snapshot handlers so delivery runs without holding the lock;
        // a handler may itself subscribe or publish.
        let matching: Vec<Handler> = {
            let subs = self.subscribers.read().unwrap();
            subs.iter()
                .filter(|s| s.pattern.matches(&event.event_type))
                .map(|s| s.handler.clone())
                .collect()
        };

        let mut delivered = 0;
        for handler in matching {
            match handler(event) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(event_type = %event.event_type, %err, "event subscriber failed");
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_sub(bus: &EventBus, pattern: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        bus.subscribe(pattern, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        count
    }

    #[test]
    fn publish_reaches_matching_subscribers_only() {
        let bus = EventBus::new();
        let loads = counter_sub(&bus, "load.*");
        let everything = counter_sub(&bus, "*");

        bus.publish(&Event::new("load.started"));
        bus.publish(&Event::new("search.completed"));

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(everything.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_subscriber_does_not_block_others() {
        let bus = EventBus::new();
        bus.subscribe("*", |_| anyhow::bail!("observer exploded"));
        let healthy = counter_sub(&bus, "*");

        let delivered = bus.publish(&Event::new("load.completed"));

        assert_eq!(delivered, 1);
        assert_eq!(healthy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_subscribers_is_valid() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(&Event::new("load.started")), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let id = bus.subscribe("*", move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(&Event::new("load.started"));
        assert!(bus.unsubscribe(id));
        bus.publish(&Event::new("load.started"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!bus.unsubscribe(id));
    }
}
