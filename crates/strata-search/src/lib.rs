//! # strata-search
//!
//! Substring search over the tiered store. Two phases: narrow the candidate
//! set by layer, then scan the survivors case-insensitively. Scans honor a
//! cooperative deadline and return partial results instead of failing.

mod engine;

pub use engine::{SearchEngine, SearchHit, SearchResults};
