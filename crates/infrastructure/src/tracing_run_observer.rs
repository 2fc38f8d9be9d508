use dsretain_application::{
    DatastreamProgress, FailureReason, PairProgress, PurgeMode, PurgeOutcome,
    RetentionRunObserver, RetentionRunRequest, RunSummary, SkipReason,
};
use dsretain_domain::{DatastreamId, ObjectPid};
use tracing::{error, info, warn};

/// Run observer that emits one structured log event per decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunObserver;

impl TracingRunObserver {
    /// Creates a tracing observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RetentionRunObserver for TracingRunObserver {
    fn run_started(&self, request: &RetentionRunRequest) {
        info!(
            root = %request.root,
            keep = request.policy.keep(),
            datastreams = request.distinct_datastream_ids().len(),
            dry_run = request.mode == PurgeMode::DryRun,
            "retention run started"
        );
    }

    fn datastream_started(&self, progress: DatastreamProgress, dsid: &DatastreamId) {
        info!(
            dsid = %dsid,
            position = progress.position,
            total = progress.total,
            "processing datastream"
        );
    }

    fn discovery_failed(&self, dsid: &DatastreamId, error: &str) {
        error!(
            dsid = %dsid,
            error = %error,
            "resource index query failed, continuing without objects"
        );
    }

    fn objects_discovered(&self, dsid: &DatastreamId, count: usize) {
        if count == 0 {
            info!(dsid = %dsid, "no objects found");
        } else {
            info!(dsid = %dsid, objects = count, "objects found");
        }
    }

    fn pair_finished(
        &self,
        progress: PairProgress,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        outcome: &PurgeOutcome,
    ) {
        let datastream = format!(
            "{}/{}",
            progress.datastream.position, progress.datastream.total
        );
        let object = format!("{}/{}", progress.completed, progress.total);

        match outcome {
            PurgeOutcome::Purged {
                deleted_estimate,
                boundary,
                store_message,
                shares_boundary_timestamp,
            } => {
                info!(
                    datastream = %datastream,
                    object = %object,
                    pid = %pid,
                    dsid = %dsid,
                    outcome = outcome.as_str(),
                    end_dt = %boundary,
                    deleted_estimate = *deleted_estimate,
                    response = %store_message,
                    "purged old versions"
                );
                if *shares_boundary_timestamp {
                    warn!(
                        pid = %pid,
                        dsid = %dsid,
                        end_dt = %boundary,
                        "a purged version shares the boundary timestamp; the store decides whether it survives"
                    );
                }
            }
            PurgeOutcome::Skipped(reason @ SkipReason::NothingToPurge { total }) => {
                info!(
                    datastream = %datastream,
                    object = %object,
                    pid = %pid,
                    dsid = %dsid,
                    outcome = outcome.as_str(),
                    reason = reason.as_str(),
                    versions = *total,
                    "no versions to purge"
                );
            }
            PurgeOutcome::Skipped(
                reason @ SkipReason::DryRun {
                    boundary,
                    would_delete,
                    shares_boundary_timestamp,
                },
            ) => {
                info!(
                    datastream = %datastream,
                    object = %object,
                    pid = %pid,
                    dsid = %dsid,
                    outcome = outcome.as_str(),
                    reason = reason.as_str(),
                    end_dt = %boundary,
                    would_delete = *would_delete,
                    shared_boundary_timestamp = *shares_boundary_timestamp,
                    "dry run, versions would be purged"
                );
            }
            PurgeOutcome::Failed(reason) => {
                let status = match reason {
                    FailureReason::StoreRejected { status, .. } => Some(*status),
                    FailureReason::HistoryUnavailable(_) | FailureReason::Transport(_) => None,
                };
                error!(
                    datastream = %datastream,
                    object = %object,
                    pid = %pid,
                    dsid = %dsid,
                    outcome = outcome.as_str(),
                    reason = reason.as_str(),
                    status = ?status,
                    detail = %reason.detail(),
                    "failed to enforce retention"
                );
            }
        }
    }

    fn run_finished(&self, summary: &RunSummary) {
        let elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds();
        info!(
            datastreams = summary.datastreams,
            datastreams_without_objects = summary.datastreams_without_objects,
            failed_discoveries = summary.failed_discoveries,
            pairs = summary.pairs,
            purged = summary.purged,
            skipped = summary.skipped,
            failed = summary.failed,
            versions_purged_estimate = summary.versions_purged_estimate,
            versions_planned_estimate = summary.versions_planned_estimate,
            elapsed_ms,
            "done"
        );
    }
}
