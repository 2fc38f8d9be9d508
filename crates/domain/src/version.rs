use std::collections::HashSet;

use dsretain_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::retention::{PurgeBoundary, PurgePlan, RetentionDecision, RetentionPolicy};

/// One historical state of a datastream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Per-datastream version number.
    pub number: u32,
    /// Creation timestamp exactly as reported by the repository.
    pub created: String,
}

impl VersionRecord {
    /// Creates a version record.
    #[must_use]
    pub fn new(number: u32, created: impl Into<String>) -> Self {
        Self {
            number,
            created: created.into(),
        }
    }
}

/// Extracts the numeric suffix from a composite version id such as `DC.3`.
pub fn parse_version_number(version_id: &str) -> AppResult<u32> {
    let (_, suffix) = version_id.rsplit_once('.').ok_or_else(|| {
        AppError::MalformedResponse(format!(
            "version id '{version_id}' is not of the form '<dsid>.<n>'"
        ))
    })?;

    suffix.parse::<u32>().map_err(|error| {
        AppError::MalformedResponse(format!(
            "version id '{version_id}' has a non-numeric suffix: {error}"
        ))
    })
}

/// Version history of one object/datastream pair, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHistory {
    records: Vec<VersionRecord>,
}

impl VersionHistory {
    /// Builds a history ordered by ascending version number.
    ///
    /// Records may arrive newest-first; they are reordered by version number.
    /// Duplicate version numbers are rejected as a malformed history.
    pub fn new(mut records: Vec<VersionRecord>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.number) {
                return Err(AppError::MalformedResponse(format!(
                    "version {} appears more than once in history",
                    record.number
                )));
            }
        }

        records.sort_by_key(|record| record.number);
        Ok(Self { records })
    }

    /// Returns the number of versions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true when the history has no versions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[VersionRecord] {
        self.records.as_slice()
    }

    /// Decides which versions a retention policy removes.
    ///
    /// The boundary is the creation timestamp of the oldest retained version;
    /// everything created strictly before it is deleted.
    #[must_use]
    pub fn plan_retention(&self, policy: RetentionPolicy) -> RetentionDecision {
        let total = self.records.len();
        let keep = policy.keep();

        if total <= keep {
            return RetentionDecision::NothingToPurge { total };
        }

        let cut_index = total - keep;
        let oldest_retained = &self.records[cut_index];
        let newest_purged = &self.records[cut_index - 1];

        RetentionDecision::Purge(PurgePlan {
            boundary: PurgeBoundary::new(oldest_retained.created.clone()),
            boundary_version: oldest_retained.number,
            purge_count: cut_index,
            retained_count: keep,
            shares_boundary_timestamp: newest_purged.created == oldest_retained.created,
        })
    }
}
