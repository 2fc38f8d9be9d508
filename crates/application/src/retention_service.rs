use std::sync::Arc;

use dsretain_core::{AppError, AppResult};
use dsretain_domain::{
    DatastreamId, ObjectPid, PurgePlan, RetentionDecision, RetentionPolicy, VersionHistory,
};

use crate::retention_ports::{
    FailureReason, PurgeMode, PurgeOutcome, SkipReason, VersionHistorySource, VersionPurger,
};

/// Retention enforcement for single object/datastream pairs.
#[derive(Clone)]
pub struct RetentionService {
    history_source: Arc<dyn VersionHistorySource>,
    purger: Arc<dyn VersionPurger>,
}

impl RetentionService {
    /// Creates a retention service.
    #[must_use]
    pub fn new(
        history_source: Arc<dyn VersionHistorySource>,
        purger: Arc<dyn VersionPurger>,
    ) -> Self {
        Self {
            history_source,
            purger,
        }
    }

    /// Loads the version history of one pair, oldest first.
    pub async fn load_history(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
    ) -> AppResult<VersionHistory> {
        let records = self.history_source.get_versions(pid, dsid).await?;
        VersionHistory::new(records)
    }

    /// Keeps the `policy.keep()` newest versions of one pair and purges the rest.
    ///
    /// Never returns an error: every failure is folded into the outcome.
    pub async fn purge(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        policy: RetentionPolicy,
        mode: PurgeMode,
    ) -> PurgeOutcome {
        let history = match self.load_history(pid, dsid).await {
            Ok(history) => history,
            Err(error) => {
                return PurgeOutcome::Failed(FailureReason::HistoryUnavailable(
                    error.to_string(),
                ));
            }
        };

        let plan = match history.plan_retention(policy) {
            RetentionDecision::NothingToPurge { total } => {
                return PurgeOutcome::Skipped(SkipReason::NothingToPurge { total });
            }
            RetentionDecision::Purge(plan) => plan,
        };

        match mode {
            PurgeMode::DryRun => PurgeOutcome::Skipped(SkipReason::DryRun {
                boundary: plan.boundary,
                would_delete: plan.purge_count,
                shares_boundary_timestamp: plan.shares_boundary_timestamp,
            }),
            PurgeMode::Apply => self.execute_plan(pid, dsid, plan).await,
        }
    }

    async fn execute_plan(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        plan: PurgePlan,
    ) -> PurgeOutcome {
        match self
            .purger
            .purge_versions_before(pid, dsid, &plan.boundary)
            .await
        {
            Ok(receipt) => PurgeOutcome::Purged {
                deleted_estimate: plan.purge_count,
                boundary: plan.boundary,
                store_message: receipt.message,
                shares_boundary_timestamp: plan.shares_boundary_timestamp,
            },
            Err(AppError::UpstreamStatus { status, message }) => {
                PurgeOutcome::Failed(FailureReason::StoreRejected { status, message })
            }
            Err(error) => PurgeOutcome::Failed(FailureReason::Transport(error.to_string())),
        }
    }
}

#[cfg(test)]
mod tests;
