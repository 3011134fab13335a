//! Storage error types.

use thiserror::Error;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage engine error: {0}")]
    Engine(#[from] sled::Error),

    #[error("corrupt {namespace} record '{key}': {source}")]
    Corrupt {
        namespace: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode {namespace} record '{key}': {source}")]
    Encode {
        namespace: &'static str,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}
