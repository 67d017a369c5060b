//! RepoStore Core - Quota-Aware Storage Layer for Artifact Repositories
//!
//! This crate provides the admission-control core used by repository
//! storage backends: it measures the bytes currently occupied under a
//! storage root and decides, under a configured quota policy, whether a
//! pending artifact write still fits.

pub mod storage;

use thiserror::Error;

/// Main error type for RepoStore operations
#[derive(Error, Debug)]
pub enum RepoStoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] storage::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RepoStoreError>;

/// Storage configuration for a single repository
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StorageSettings {
    /// Backend selector ("fs" for local filesystem storage)
    pub storage_provider: String,

    /// Quota: a byte size ("10GB") or a share of the disk ("80%")
    pub quota: String,

    /// Lifetime bound for per-resource write locks (seconds)
    pub max_resource_lock_lifetime_in_seconds: u32,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            storage_provider: "fs".to_string(),
            quota: "100%".to_string(), // whole disk unless narrowed
            max_resource_lock_lifetime_in_seconds: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = StorageSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let restored: StorageSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.storage_provider, "fs");
        assert_eq!(restored.quota, "100%");
        assert_eq!(restored.max_resource_lock_lifetime_in_seconds, 60);
    }
}
