use async_trait::async_trait;

use crate::entry::{Content, LayerName};
use crate::errors::StrataResult;

/// External content source, invoked on cache miss behind the executor.
///
/// A missing key is reported as `ResolveError::NotFoundInLayer`; I/O failures
/// use `StrataError::Loader`. The store never does I/O itself.
#[async_trait]
pub trait Loader: Send + Sync {
    async fn load(&self, layer: &LayerName, key: &str) -> StrataResult<Content>;
}
