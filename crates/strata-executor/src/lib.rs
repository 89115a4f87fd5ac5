//! # strata-executor
//!
//! Every retrieval or computation in the engine runs through here: bound to
//! one timeout tier, guarded by a per-operation-class circuit breaker, and
//! degraded through an ordered fallback chain instead of hanging. A terminal
//! event fires on every exit path.

mod breaker;
mod executor;
mod fallback;
mod retry;
mod scope;

pub use breaker::{CircuitBreaker, CircuitSnapshot, CircuitState};
pub use executor::{Executor, Outcome, OutcomeSource};
pub use fallback::FallbackChain;
pub use retry::retry_idempotent;
