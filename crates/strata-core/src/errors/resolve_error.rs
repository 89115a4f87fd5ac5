/// Resolver errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("key not found in any layer: {key}")]
    NotFound { key: String },

    #[error("key not found in layer {layer}: {key}")]
    NotFoundInLayer { layer: String, key: String },

    #[error("unknown layer: {layer}")]
    UnknownLayer { layer: String },
}
