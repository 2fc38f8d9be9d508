use async_trait::async_trait;
use dsretain_core::AppResult;
use dsretain_domain::{DatastreamId, ObjectPid};

/// Query port for locating objects under a collection root.
#[async_trait]
pub trait ObjectIndex: Send + Sync {
    /// Returns objects transitively inside `root` that disseminate a
    /// datastream whose reference contains `dsid`.
    ///
    /// The result may contain duplicates and carries no ordering guarantee.
    async fn find_objects(
        &self,
        dsid: &DatastreamId,
        root: &ObjectPid,
    ) -> AppResult<Vec<ObjectPid>>;
}
