use chrono::{DateTime, Utc};
use dsretain_domain::{DatastreamId, ObjectPid, RetentionPolicy};

use super::outcome::{PurgeMode, PurgeOutcome, SkipReason};

/// Input for one retention run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionRunRequest {
    /// Datastreams to enforce, in reporting order.
    pub datastream_ids: Vec<DatastreamId>,
    /// Collection object whose membership closure is searched.
    pub root: ObjectPid,
    /// Versions to keep per pair.
    pub policy: RetentionPolicy,
    /// Whether deletes are issued.
    pub mode: PurgeMode,
}

impl RetentionRunRequest {
    /// Returns the requested datastreams with duplicates removed, first
    /// occurrence order kept.
    #[must_use]
    pub fn distinct_datastream_ids(&self) -> Vec<DatastreamId> {
        let mut distinct: Vec<DatastreamId> = Vec::with_capacity(self.datastream_ids.len());
        for dsid in &self.datastream_ids {
            if !distinct.contains(dsid) {
                distinct.push(dsid.clone());
            }
        }
        distinct
    }
}

/// Aggregated result of one retention run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Run start timestamp.
    pub started_at: DateTime<Utc>,
    /// Run finish timestamp.
    pub finished_at: DateTime<Utc>,
    /// Distinct datastreams processed.
    pub datastreams: usize,
    /// Datastreams for which no object was found.
    pub datastreams_without_objects: usize,
    /// Datastreams whose discovery query failed.
    pub failed_discoveries: usize,
    /// Object/datastream pairs processed.
    pub pairs: usize,
    /// Pairs whose old versions were purged.
    pub purged: usize,
    /// Pairs left untouched without error.
    pub skipped: usize,
    /// Pairs that could not be processed.
    pub failed: usize,
    /// Sum of per-pair delete estimates for purged pairs.
    pub versions_purged_estimate: usize,
    /// Sum of per-pair delete estimates for dry-run pairs.
    pub versions_planned_estimate: usize,
}

impl RunSummary {
    /// Creates an empty summary for a run starting now.
    #[must_use]
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            datastreams: 0,
            datastreams_without_objects: 0,
            failed_discoveries: 0,
            pairs: 0,
            purged: 0,
            skipped: 0,
            failed: 0,
            versions_purged_estimate: 0,
            versions_planned_estimate: 0,
        }
    }

    /// Adds one pair outcome to the counters.
    pub fn record(&mut self, outcome: &PurgeOutcome) {
        self.pairs = self.pairs.saturating_add(1);
        match outcome {
            PurgeOutcome::Purged {
                deleted_estimate, ..
            } => {
                self.purged = self.purged.saturating_add(1);
                self.versions_purged_estimate =
                    self.versions_purged_estimate.saturating_add(*deleted_estimate);
            }
            PurgeOutcome::Skipped(reason) => {
                self.skipped = self.skipped.saturating_add(1);
                if let SkipReason::DryRun { would_delete, .. } = reason {
                    self.versions_planned_estimate =
                        self.versions_planned_estimate.saturating_add(*would_delete);
                }
            }
            PurgeOutcome::Failed(_) => {
                self.failed = self.failed.saturating_add(1);
            }
        }
    }

    /// Marks the run as finished now.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}
