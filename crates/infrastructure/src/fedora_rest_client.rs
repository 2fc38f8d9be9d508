use async_trait::async_trait;
use dsretain_application::{PurgeReceipt, VersionHistorySource, VersionPurger};
use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid, PurgeBoundary, VersionRecord};
use tracing::debug;

use crate::fedora_connection::FedoraConnection;

mod history_document;

use history_document::parse_history_document;

/// REST API adapter for datastream history reads and version purges.
#[derive(Clone)]
pub struct FedoraRestClient {
    connection: FedoraConnection,
}

impl FedoraRestClient {
    /// Creates a REST client over a shared connection.
    #[must_use]
    pub fn new(connection: FedoraConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl VersionHistorySource for FedoraRestClient {
    async fn get_versions(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
    ) -> AppResult<Vec<VersionRecord>> {
        let mut url = self.connection.datastream_url(pid, dsid, &["history"])?;
        url.query_pairs_mut().append_pair("format", "xml");

        debug!(pid = %pid, dsid = %dsid, "fetching datastream history");

        let response = self.connection.get(url).send().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to fetch history for pid {pid} dsid {dsid}: {error}"
            ))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to read history for pid {pid} dsid {dsid}: {error}"
            ))
        })?;

        if !status.is_success() {
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message: format!("failed to get version history for pid {pid} dsid {dsid}"),
            });
        }

        parse_history_document(body.as_str())
    }
}

#[async_trait]
impl VersionPurger for FedoraRestClient {
    async fn purge_versions_before(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        boundary: &PurgeBoundary,
    ) -> AppResult<PurgeReceipt> {
        let mut url = self.connection.datastream_url(pid, dsid, &[])?;
        url.query_pairs_mut().append_pair("endDT", boundary.as_str());

        debug!(pid = %pid, dsid = %dsid, end_dt = %boundary, "purging datastream versions");

        let response = self.connection.delete(url).send().await.map_err(|error| {
            AppError::Transport(format!(
                "failed to purge versions for pid {pid} dsid {dsid}: {error}"
            ))
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_owned());

        if !status.is_success() {
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(PurgeReceipt {
            status: status.as_u16(),
            message: body,
        })
    }
}
