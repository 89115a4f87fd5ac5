//! # strata-resolver
//!
//! Merges the configured layers into one logical view. Lookups scan layers
//! best rank first; the resolver never mutates entries and never caches,
//! every read goes through the store.

mod merge;
mod resolver;

pub use resolver::Resolver;
