/// Configuration errors. Fatal at startup; the engine must not enter service.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no layers configured")]
    NoLayers,

    #[error("duplicate layer name: {name}")]
    DuplicateLayerName { name: String },

    #[error("duplicate layer rank {rank} ({first} and {second})")]
    DuplicateLayerRank {
        rank: u32,
        first: String,
        second: String,
    },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
