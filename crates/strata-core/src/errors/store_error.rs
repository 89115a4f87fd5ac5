/// Store-layer errors for tiered cache operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("entry too large for any tier: {size_bytes} bytes for {layer}/{key}")]
    EntryTooLarge {
        layer: String,
        key: String,
        size_bytes: usize,
    },
}
