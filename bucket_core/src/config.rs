//! Bucket configuration, loaded from TOML.

use bucket_store::{StorageConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Who counts as a privileged requester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Names that are always privileged.
    #[serde(default)]
    pub admins: Vec<String>,

    /// Channel modes (e.g. `"o"` for operators) that make a sender privileged
    /// in public contexts.
    #[serde(default)]
    pub admin_modes: String,
}

/// Top-level configuration.
///
/// ```toml
/// [storage]
/// path = "./data/bucket"
///
/// [identity]
/// admins = ["alice"]
/// admin_modes = "o"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub identity: IdentityConfig,
}

impl BucketConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
