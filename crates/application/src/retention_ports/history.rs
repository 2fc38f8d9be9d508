use async_trait::async_trait;
use dsretain_core::AppResult;
use dsretain_domain::{DatastreamId, ObjectPid, VersionRecord};

/// Read port for datastream version histories.
#[async_trait]
pub trait VersionHistorySource: Send + Sync {
    /// Returns version records in the order the store emits them.
    async fn get_versions(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
    ) -> AppResult<Vec<VersionRecord>>;
}
