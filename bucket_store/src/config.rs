//! Storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::StoreError;

fn default_path() -> PathBuf {
    PathBuf::from("./data/bucket")
}

/// Where and how the sled database is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the sled database.
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Keep the database in memory and remove it when the store is dropped.
    #[serde(default)]
    pub temporary: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            temporary: false,
        }
    }
}

impl StorageConfig {
    /// A throwaway in-memory configuration.
    pub fn temporary() -> Self {
        Self {
            temporary: true,
            ..Self::default()
        }
    }

    /// Parse a `[storage]`-shaped TOML table.
    pub fn from_toml_str(source: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StorageConfig::default());
        assert!(!config.temporary);
    }

    #[test]
    fn test_parse() {
        let config = StorageConfig::from_toml_str("path = \"/tmp/kb\"\ntemporary = true\n").unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/kb"));
        assert!(config.temporary);
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(
            StorageConfig::from_toml_str("temporary = \"yes\""),
            Err(StoreError::Config(_))
        ));
    }
}
