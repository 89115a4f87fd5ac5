//! # strata-events
//!
//! In-process, best-effort event delivery. Subscribers observe lifecycle
//! events (`load.started`, `search.failed`, ...) by type pattern. A failing
//! subscriber never blocks other subscribers or the publisher, and events
//! not consumed at publish time are simply lost: this is an observability
//! channel, not a durable log. The engine is correct with zero subscribers.

mod bus;
mod pattern;

pub use bus::{EventBus, SubscriptionId};
pub use pattern::TypePattern;
