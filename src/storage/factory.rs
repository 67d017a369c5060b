//! Provider Factory - Wiring providers from configuration strings
//!
//! Thin glue between repository settings and a ready-to-use provider:
//! picks the backend from the selector, parses and validates the quota,
//! and creates the storage root on disk.

use super::provider::StorageProvider;
use super::quota::QuotaPolicy;
use super::usage::FileSystemProbe;
use super::ConfigError;
use crate::{Result, StorageSettings};
use std::fs;
use std::path::Path;

/// Directory under the working directory that holds all repository roots.
pub const REPOSITORIES_PATH: &str = "repositories";

/// Build a storage provider for one repository.
///
/// The selector must name a supported backend; unknown selectors are
/// rejected rather than silently defaulted. Quota and lock lifetime are
/// validated here, before any provider exists.
pub fn create_storage_provider(
    working_directory: &Path,
    repository_name: &str,
    storage_description: &str,
    quota: &str,
    max_resource_lock_lifetime_in_seconds: u32,
) -> Result<StorageProvider> {
    if max_resource_lock_lifetime_in_seconds == 0 {
        return Err(ConfigError::InvalidLockLifetime.into());
    }

    if storage_description.starts_with("fs") {
        let policy: QuotaPolicy = quota.parse()?;

        let root = working_directory
            .join(REPOSITORIES_PATH)
            .join(repository_name);
        fs::create_dir_all(&root)?;

        tracing::debug!(
            "Mounting filesystem storage for {} at {} ({})",
            repository_name,
            root.display(),
            policy
        );

        let probe = FileSystemProbe::new(&root);
        return Ok(StorageProvider::new(
            root,
            policy,
            Box::new(probe),
            max_resource_lock_lifetime_in_seconds,
        ));
    }

    Err(ConfigError::UnsupportedBackend(storage_description.to_string()).into())
}

/// Convenience wrapper over [`create_storage_provider`] for callers that
/// carry a [`StorageSettings`] block per repository.
pub fn provider_from_settings(
    working_directory: &Path,
    repository_name: &str,
    settings: &StorageSettings,
) -> Result<StorageProvider> {
    create_storage_provider(
        working_directory,
        repository_name,
        &settings.storage_provider,
        &settings.quota,
        settings.max_resource_lock_lifetime_in_seconds,
    )
}
