use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use dsretain_application::{ObjectIndex, PurgeReceipt, VersionHistorySource, VersionPurger};
use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid, PurgeBoundary, VersionRecord};
use tokio::sync::RwLock;

/// In-memory repository with collection membership and datastream versions.
///
/// Mirrors the REST API: histories are emitted newest first and purges
/// remove every version created strictly before the boundary.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    memberships: RwLock<HashMap<ObjectPid, HashSet<ObjectPid>>>,
    datastreams: RwLock<BTreeMap<(ObjectPid, String), Vec<VersionRecord>>>,
}

impl InMemoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `member` is a member of `collection`.
    pub async fn add_member(&self, member: &ObjectPid, collection: &ObjectPid) {
        self.memberships
            .write()
            .await
            .entry(member.clone())
            .or_default()
            .insert(collection.clone());
    }

    /// Appends one version to a datastream, creating the datastream if needed.
    pub async fn add_version(&self, pid: &ObjectPid, dsid: &str, created: &str) -> VersionRecord {
        let mut datastreams = self.datastreams.write().await;
        let versions = datastreams
            .entry((pid.clone(), dsid.to_owned()))
            .or_default();
        let number = versions
            .iter()
            .map(|record| record.number.saturating_add(1))
            .max()
            .unwrap_or(0);
        let record = VersionRecord::new(number, created);
        versions.push(record.clone());
        record
    }

    /// Returns current versions of one datastream, oldest first.
    pub async fn versions(&self, pid: &ObjectPid, dsid: &str) -> Vec<VersionRecord> {
        self.datastreams
            .read()
            .await
            .get(&(pid.clone(), dsid.to_owned()))
            .cloned()
            .unwrap_or_default()
    }

    async fn is_transitive_member(&self, pid: &ObjectPid, root: &ObjectPid) -> bool {
        let memberships = self.memberships.read().await;
        let mut visited = HashSet::new();
        let mut pending: VecDeque<&ObjectPid> = VecDeque::from([pid]);

        while let Some(current) = pending.pop_front() {
            let Some(collections) = memberships.get(current) else {
                continue;
            };
            for collection in collections {
                if collection == root {
                    return true;
                }
                if visited.insert(collection) {
                    pending.push_back(collection);
                }
            }
        }

        false
    }
}

#[async_trait]
impl ObjectIndex for InMemoryRepository {
    async fn find_objects(
        &self,
        dsid: &DatastreamId,
        root: &ObjectPid,
    ) -> AppResult<Vec<ObjectPid>> {
        let candidates: Vec<ObjectPid> = {
            let datastreams = self.datastreams.read().await;
            datastreams
                .keys()
                .filter(|(pid, stored_dsid)| {
                    format!("{}/{stored_dsid}", pid.resource_uri()).contains(dsid.as_str())
                })
                .map(|(pid, _)| pid.clone())
                .collect()
        };

        let mut found = Vec::new();
        for pid in candidates {
            if self.is_transitive_member(&pid, root).await {
                found.push(pid);
            }
        }

        Ok(found)
    }
}

#[async_trait]
impl VersionHistorySource for InMemoryRepository {
    async fn get_versions(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
    ) -> AppResult<Vec<VersionRecord>> {
        let datastreams = self.datastreams.read().await;
        let versions = datastreams
            .get(&(pid.clone(), dsid.as_str().to_owned()))
            .ok_or_else(|| AppError::UpstreamStatus {
                status: 404,
                message: format!("no datastream {dsid} on object {pid}"),
            })?;

        Ok(versions.iter().rev().cloned().collect())
    }
}

#[async_trait]
impl VersionPurger for InMemoryRepository {
    async fn purge_versions_before(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        boundary: &PurgeBoundary,
    ) -> AppResult<PurgeReceipt> {
        let mut datastreams = self.datastreams.write().await;
        let versions = datastreams
            .get_mut(&(pid.clone(), dsid.as_str().to_owned()))
            .ok_or_else(|| AppError::UpstreamStatus {
                status: 404,
                message: format!("no datastream {dsid} on object {pid}"),
            })?;

        let (purged, retained): (Vec<VersionRecord>, Vec<VersionRecord>) = versions
            .drain(..)
            .partition(|record| record.created.as_str() < boundary.as_str());
        *versions = retained;

        let purged_dates: Vec<&str> = purged.iter().map(|record| record.created.as_str()).collect();
        let message = serde_json::to_string(&purged_dates)
            .map_err(|error| AppError::Internal(format!("failed to encode purge result: {error}")))?;

        Ok(PurgeReceipt {
            status: 200,
            message,
        })
    }
}
