//! Storage Provider - Admission control for repository writes
//!
//! Composes a usage probe with a quota policy behind one `can_hold`
//! entry point. This is the unit the write path depends on.

use super::quota::{Admission, QuotaPolicy};
use super::usage::UsageProbe;
use super::StorageError;
use std::path::{Path, PathBuf};

/// Quota-guarded storage root for a single repository.
///
/// Owns its root for the provider's lifetime; the policy is fixed at
/// construction and never swapped.
pub struct StorageProvider {
    root: PathBuf,
    policy: QuotaPolicy,
    probe: Box<dyn UsageProbe>,
    max_resource_lock_lifetime_in_seconds: u32,
}

impl StorageProvider {
    pub fn new(
        root: impl Into<PathBuf>,
        policy: QuotaPolicy,
        probe: Box<dyn UsageProbe>,
        max_resource_lock_lifetime_in_seconds: u32,
    ) -> Self {
        Self {
            root: root.into(),
            policy,
            probe,
            max_resource_lock_lifetime_in_seconds,
        }
    }

    /// Check whether the repository can hold `content_length` more bytes,
    /// returning the remaining headroom when it can.
    ///
    /// The check is stateless and authoritative only for the instant it
    /// runs: usage is re-measured per call and no reservation is held, so
    /// two concurrent callers can both be admitted against the same
    /// headroom. The quota is a soft ceiling enforced at admission time;
    /// deployments needing a hard bound must add an atomic reservation
    /// step around the actual write.
    pub fn can_hold(&self, content_length: i64) -> Result<i64, StorageError> {
        if content_length < 0 {
            return Err(StorageError::InvalidContentLength(content_length));
        }

        let usage = clamp_to_i64(self.probe.usage()?);
        let capacity_hint = if self.policy.requires_capacity_hint() {
            Some(clamp_to_i64(self.probe.usable_capacity()?))
        } else {
            None
        };

        match self.policy.evaluate(usage, capacity_hint, content_length)? {
            Admission::Allowed { headroom } => {
                tracing::debug!(
                    "{} admits {} bytes, {} headroom left",
                    self.root.display(),
                    content_length,
                    headroom
                );
                Ok(headroom)
            }
            Admission::Denied {
                reason,
                requested,
                limit,
            } => {
                tracing::warn!(
                    "{} rejects {} bytes: {}",
                    self.root.display(),
                    requested,
                    reason
                );
                Err(StorageError::QuotaExceeded {
                    reason,
                    requested,
                    limit,
                })
            }
        }
    }

    /// Bytes currently occupied under this provider's root.
    pub fn usage(&self) -> Result<u64, StorageError> {
        Ok(self.probe.usage()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn quota_policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Lock lifetime forwarded to the surrounding write-locking layer;
    /// carried through unmodified, never interpreted here.
    pub fn max_resource_lock_lifetime_in_seconds(&self) -> u32 {
        self.max_resource_lock_lifetime_in_seconds
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
