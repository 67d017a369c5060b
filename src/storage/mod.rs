//! Storage Module - Quota-aware admission control
//!
//! Decides, before any bytes are accepted, whether a repository has room
//! for a pending write. Usage measurement is backend-specific; the quota
//! decision itself is pure arithmetic.

mod factory;
mod provider;
mod quota;
mod usage;

pub use factory::{create_storage_provider, provider_from_settings, REPOSITORIES_PATH};
pub use provider::StorageProvider;
pub use quota::{Admission, MissingCapacityHint, QuotaPolicy};
pub use usage::{FileSystemProbe, UsageProbe};

use thiserror::Error;

/// Runtime failures of the storage layer.
///
/// Quota denial and backend failure are deliberately distinct variants:
/// "storage full" is a deterministic policy outcome, "storage broken" is
/// an operational fault, and monitoring needs to tell them apart.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The configured quota cannot hold the requested write.
    #[error("Repository cannot hold {requested} bytes: {reason}")]
    QuotaExceeded {
        reason: String,
        requested: i64,
        limit: i64,
    },

    /// The backend could not be queried for usage or capacity.
    #[error("Storage backend unavailable: {0}")]
    BackendUnavailable(#[from] std::io::Error),

    /// Caller contract violation, not a quota outcome.
    #[error("Content length must be non-negative, got {0}")]
    InvalidContentLength(i64),

    #[error(transparent)]
    MissingCapacityHint(#[from] quota::MissingCapacityHint),
}

/// Invalid configuration, rejected at construction time and never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Max size must be greater than 0, got {0}")]
    InvalidMaxSize(i64),

    #[error("Percentage must be within (0.0, 1.0], got {0}")]
    InvalidFraction(f64),

    #[error("Unrecognized quota value: {0}")]
    UnparseableQuota(String),

    #[error("Unknown storage provider: {0}")]
    UnsupportedBackend(String),

    #[error("Resource lock lifetime must be a positive number of seconds")]
    InvalidLockLifetime,
}
