use std::fmt::{Display, Formatter};

use dsretain_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Number of most recent versions to preserve per object/datastream pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    keep: usize,
}

impl RetentionPolicy {
    /// Creates a validated retention policy.
    pub fn new(keep: usize) -> AppResult<Self> {
        if keep == 0 {
            return Err(AppError::Validation(
                "keep must be at least 1".to_owned(),
            ));
        }

        Ok(Self { keep })
    }

    /// Returns the number of versions to keep.
    #[must_use]
    pub fn keep(&self) -> usize {
        self.keep
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { keep: 1 }
    }
}

/// Exclusive upper-bound timestamp for a version delete request.
///
/// Holds the repository's timestamp string verbatim; it is never reformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeBoundary(String);

impl PurgeBoundary {
    /// Wraps a repository timestamp.
    #[must_use]
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }

    /// Returns the timestamp string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PurgeBoundary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Computed delete request for one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgePlan {
    /// Creation timestamp of the oldest retained version.
    pub boundary: PurgeBoundary,
    /// Version number of the oldest retained version.
    pub boundary_version: u32,
    /// Versions expected to be removed.
    pub purge_count: usize,
    /// Versions expected to survive.
    pub retained_count: usize,
    /// True when the newest purged version has the boundary timestamp too.
    ///
    /// An exclusive timestamp bound cannot separate such versions, so the
    /// store decides; callers only report it.
    pub shares_boundary_timestamp: bool,
}

/// Outcome of applying a retention policy to one history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionDecision {
    /// History already fits the policy.
    NothingToPurge {
        /// Versions currently present.
        total: usize,
    },
    /// Older versions must be purged.
    Purge(PurgePlan),
}
