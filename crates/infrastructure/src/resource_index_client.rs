use async_trait::async_trait;
use dsretain_application::ObjectIndex;
use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::fedora_connection::FedoraConnection;
use crate::sparql::membership_query;

#[derive(Debug, Deserialize)]
struct TupleResponse {
    results: Vec<TupleBinding>,
}

#[derive(Debug, Deserialize)]
struct TupleBinding {
    x: String,
}

/// Resource index adapter for object discovery.
#[derive(Clone)]
pub struct ResourceIndexClient {
    connection: FedoraConnection,
}

impl ResourceIndexClient {
    /// Creates a resource index client over a shared connection.
    #[must_use]
    pub fn new(connection: FedoraConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ObjectIndex for ResourceIndexClient {
    async fn find_objects(
        &self,
        dsid: &DatastreamId,
        root: &ObjectPid,
    ) -> AppResult<Vec<ObjectPid>> {
        let query = membership_query(dsid, root);
        let mut url = self.connection.risearch_url();
        url.query_pairs_mut()
            .append_pair("query", query.as_str())
            .append_pair("format", "json")
            .append_pair("type", "tuples")
            .append_pair("lang", "sparql");

        debug!(dsid = %dsid, root = %root, "querying resource index");

        let response = self.connection.post(url).send().await.map_err(|error| {
            AppError::Transport(format!("failed to call resource index: {error}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            AppError::Transport(format!("failed to read resource index response: {error}"))
        })?;

        if !status.is_success() {
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                message: body,
            });
        }

        let tuples = serde_json::from_str::<TupleResponse>(body.as_str()).map_err(|error| {
            AppError::MalformedResponse(format!(
                "failed to parse resource index response body: {error}"
            ))
        })?;

        let mut pids = Vec::with_capacity(tuples.results.len());
        for binding in tuples.results {
            match ObjectPid::from_resource_uri(binding.x.as_str()) {
                Ok(pid) => pids.push(pid),
                Err(error) => warn!(
                    dsid = %dsid,
                    reference = %binding.x,
                    error = %error,
                    "ignoring unusable object reference from resource index"
                ),
            }
        }

        Ok(pids)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dsretain_application::ObjectIndex;
    use dsretain_core::AppError;
    use dsretain_domain::{DatastreamId, ObjectPid};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::ResourceIndexClient;
    use crate::fedora_connection::{FedoraConnection, FedoraConnectionConfig};
    use crate::sparql::membership_query;

    fn client(server: &MockServer) -> ResourceIndexClient {
        let base_url = Url::parse(&server.uri()).unwrap_or_else(|_| unreachable!());
        let risearch_url = base_url.join("/fedora/risearch").unwrap_or_else(|_| unreachable!());
        let connection = FedoraConnection::new(FedoraConnectionConfig {
            base_url,
            risearch_url,
            username: "fedoraAdmin".to_owned(),
            password: "secret".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap_or_else(|_| unreachable!());
        ResourceIndexClient::new(connection)
    }

    fn ids() -> (DatastreamId, ObjectPid) {
        (
            DatastreamId::new("OBJ").unwrap_or_else(|_| unreachable!()),
            ObjectPid::new("lat:corpus").unwrap_or_else(|_| unreachable!()),
        )
    }

    #[tokio::test]
    async fn strips_scheme_prefix_from_bindings() {
        let server = MockServer::start().await;
        let (dsid, root) = ids();
        Mock::given(method("POST"))
            .and(path("/fedora/risearch"))
            .and(basic_auth("fedoraAdmin", "secret"))
            .and(query_param("query", membership_query(&dsid, &root).as_str()))
            .and(query_param("format", "json"))
            .and(query_param("type", "tuples"))
            .and(query_param("lang", "sparql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"x": "info:fedora/lat:1"},
                    {"x": "info:fedora/lat:2"},
                    {"x": "not-an-object"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let pids = client(&server).find_objects(&dsid, &root).await;

        assert!(pids.is_ok());
        let pids: Vec<String> = pids
            .unwrap_or_default()
            .iter()
            .map(|pid| pid.as_str().to_owned())
            .collect();
        assert_eq!(pids, vec!["lat:1".to_owned(), "lat:2".to_owned()]);
    }

    #[tokio::test]
    async fn empty_result_set_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;
        let (dsid, root) = ids();

        let pids = client(&server).find_objects(&dsid, &root).await;

        assert!(pids.is_ok_and(|pids| pids.is_empty()));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("query failed"))
            .mount(&server)
            .await;
        let (dsid, root) = ids();

        let pids = client(&server).find_objects(&dsid, &root).await;

        assert!(matches!(
            pids,
            Err(AppError::UpstreamStatus { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn unexpected_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;
        let (dsid, root) = ids();

        let pids = client(&server).find_objects(&dsid, &root).await;

        assert!(matches!(pids, Err(AppError::MalformedResponse(_))));
    }
}
