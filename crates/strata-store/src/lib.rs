//! # strata-store
//!
//! Tiered in-memory cache: hot/warm/cold placement, retention-aware eviction
//! with a fixed candidate ordering, advisory promotion on access, and a
//! per-key load gate that serializes concurrent misses.
//!
//! The store owns entry lifecycle exclusively. It never does I/O; durable
//! sources sit behind the loader, wrapped by the executor.

mod eviction;
mod gate;
mod retention;
mod store;

pub use gate::LoadGate;
pub use store::{TierStats, TieredStore};
