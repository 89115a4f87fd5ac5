//! Entry model: the unit of content the store holds, plus the layer and
//! tier vocabulary everything else speaks.

mod base;
mod content;
mod layer;
mod retention;
mod tier;

pub use base::{Entry, EntryKey};
pub use content::Content;
pub use layer::{Layer, LayerName};
pub use retention::{RetentionMode, RetentionPolicy};
pub use tier::CacheTier;
