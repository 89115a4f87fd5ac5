//! # strata-engine
//!
//! The facade. Wires the store, resolver, executor, plugin pipeline, event
//! bus, and search engine into one explicit instance; there is no global
//! singleton, teardown is `shutdown()` and a new engine is a new value.
//!
//! Boundary operations (`get`, `search`, `info`) run through the executor so
//! every external call is timeout-bound, breaker-guarded, and observable.

mod api;
mod engine;
mod telemetry;

pub use api::{GetRequest, GetResponse, SearchHitView, SearchRequest, SearchResponse};
pub use engine::{Engine, EngineInfo, TierInfo};
pub use telemetry::init_tracing;
