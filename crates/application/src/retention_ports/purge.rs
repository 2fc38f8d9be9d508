use async_trait::async_trait;
use dsretain_core::AppResult;
use dsretain_domain::{DatastreamId, ObjectPid, PurgeBoundary};

/// Store acknowledgement for one accepted purge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeReceipt {
    /// Success status code returned by the store.
    pub status: u16,
    /// Free-text response body, kept for logging only.
    pub message: String,
}

/// Write port for boundary-based version deletion.
#[async_trait]
pub trait VersionPurger: Send + Sync {
    /// Deletes every version of the pair created strictly before `boundary`.
    ///
    /// Non-success store statuses are returned as `AppError::UpstreamStatus`.
    async fn purge_versions_before(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        boundary: &PurgeBoundary,
    ) -> AppResult<PurgeReceipt>;
}
