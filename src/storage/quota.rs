//! Quota Policies - Pure admission decisions
//!
//! Policies are expressed purely in terms of numbers (current usage,
//! backend capacity, requested size), so they need no knowledge of the
//! storage backend. This is what lets filesystem and future remote
//! backends share the same policy code.

use super::ConfigError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Storage quota for one repository, validated at construction.
///
/// Immutable once built; invalid parameters fail immediately with a
/// [`ConfigError`] instead of surfacing on first use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaPolicy {
    kind: QuotaKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QuotaKind {
    /// Hard byte ceiling, independent of the disk underneath.
    Fixed { max_bytes: i64 },
    /// Share of the usable capacity of the underlying store.
    Percentage { max_fraction: f64 },
}

/// Result of evaluating a policy against one candidate write.
///
/// Transient; nothing persists it, every check recomputes.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Allowed {
        headroom: i64,
    },
    Denied {
        reason: String,
        requested: i64,
        limit: i64,
    },
}

/// A percentage policy was evaluated without the backend's capacity.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Percentage quota requires the backend's usable capacity")]
pub struct MissingCapacityHint;

impl QuotaPolicy {
    /// Quota capped at an absolute number of bytes.
    pub fn fixed(max_bytes: i64) -> Result<Self, ConfigError> {
        if max_bytes <= 0 {
            return Err(ConfigError::InvalidMaxSize(max_bytes));
        }
        Ok(Self {
            kind: QuotaKind::Fixed { max_bytes },
        })
    }

    /// Quota capped at a fraction of the disk, `0 < max_fraction <= 1`.
    pub fn percentage(max_fraction: f64) -> Result<Self, ConfigError> {
        // Written so that NaN falls through to the error arm.
        if !(max_fraction > 0.0 && max_fraction <= 1.0) {
            return Err(ConfigError::InvalidFraction(max_fraction));
        }
        Ok(Self {
            kind: QuotaKind::Percentage { max_fraction },
        })
    }

    /// True when [`QuotaPolicy::evaluate`] needs the backend's usable
    /// capacity. Lets providers skip the capacity query for fixed quotas.
    pub fn requires_capacity_hint(&self) -> bool {
        matches!(self.kind, QuotaKind::Percentage { .. })
    }

    /// Decide whether `requested` more bytes fit next to `current_usage`.
    ///
    /// Headroom may be negative when the store shrank under existing data
    /// (disk replaced, quota lowered); every request is then denied,
    /// including a zero-byte probe. There is no zero-length special case.
    pub fn evaluate(
        &self,
        current_usage: i64,
        capacity_hint: Option<i64>,
        requested: i64,
    ) -> Result<Admission, MissingCapacityHint> {
        match self.kind {
            QuotaKind::Fixed { max_bytes } => {
                let headroom = max_bytes.saturating_sub(current_usage);
                if requested <= headroom {
                    Ok(Admission::Allowed { headroom })
                } else {
                    Ok(Admission::Denied {
                        reason: format!(
                            "short by {} bytes of the {} byte limit",
                            requested.saturating_sub(headroom),
                            max_bytes
                        ),
                        requested,
                        limit: max_bytes,
                    })
                }
            }
            QuotaKind::Percentage { max_fraction } => {
                let capacity = capacity_hint.ok_or(MissingCapacityHint)?;
                let cap = (capacity as f64 * max_fraction).floor() as i64;
                let headroom = cap.saturating_sub(current_usage);
                if requested <= headroom {
                    Ok(Admission::Allowed { headroom })
                } else {
                    Ok(Admission::Denied {
                        reason: format!(
                            "{} bytes exceed the {}% disk allowance",
                            requested,
                            max_fraction * 100.0
                        ),
                        requested,
                        limit: cap,
                    })
                }
            }
        }
    }
}

impl fmt::Display for QuotaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            QuotaKind::Fixed { max_bytes } => write!(f, "{} bytes max", max_bytes),
            QuotaKind::Percentage { max_fraction } => {
                write!(f, "{}% of disk", max_fraction * 100.0)
            }
        }
    }
}

impl FromStr for QuotaPolicy {
    type Err = ConfigError;

    /// Parses the quota notation used in repository settings: a trailing
    /// `%` selects a percentage quota ("80%"), anything else is a display
    /// size with binary units ("10GB", "512 MB", plain "1024").
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if let Some(percent) = value.strip_suffix('%') {
            let percent: f64 = percent
                .trim()
                .parse()
                .map_err(|_| ConfigError::UnparseableQuota(value.to_string()))?;
            return Self::percentage(percent / 100.0);
        }

        let digits_end = value
            .find(|c: char| !c.is_ascii_digit() && c != '-')
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(digits_end);
        let number: i64 = number
            .parse()
            .map_err(|_| ConfigError::UnparseableQuota(value.to_string()))?;

        let multiplier: i64 = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "KB" => 1024,
            "MB" => 1024 * 1024,
            "GB" => 1024 * 1024 * 1024,
            "TB" => 1024_i64.pow(4),
            _ => return Err(ConfigError::UnparseableQuota(value.to_string())),
        };

        let max_bytes = number
            .checked_mul(multiplier)
            .ok_or_else(|| ConfigError::UnparseableQuota(value.to_string()))?;

        Self::fixed(max_bytes)
    }
}
