use std::sync::Arc;
use std::time::Duration;

use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid};
use url::Url;

/// Endpoint and credential settings for one repository.
#[derive(Debug, Clone)]
pub struct FedoraConnectionConfig {
    /// Repository base URL, e.g. `http://localhost:8080/fedora`.
    pub base_url: Url,
    /// Resource index search endpoint.
    pub risearch_url: Url,
    /// Basic-auth user name.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

struct FedoraConnectionInner {
    http_client: reqwest::Client,
    base_url: Url,
    risearch_url: Url,
    username: String,
    password: String,
}

/// Shared HTTP session against the repository and its resource index.
///
/// Cloning is cheap; all clones reuse one connection pool.
#[derive(Clone)]
pub struct FedoraConnection {
    inner: Arc<FedoraConnectionInner>,
}

impl FedoraConnection {
    /// Builds the HTTP client and validates endpoint URLs.
    pub fn new(config: FedoraConnectionConfig) -> AppResult<Self> {
        if config.base_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!(
                "repository base url '{}' cannot carry path segments",
                config.base_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| {
                AppError::Configuration(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(Self {
            inner: Arc::new(FedoraConnectionInner {
                http_client,
                base_url: config.base_url,
                risearch_url: config.risearch_url,
                username: config.username,
                password: config.password,
            }),
        })
    }

    pub(crate) fn get(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http_client.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http_client.post(url))
    }

    pub(crate) fn delete(&self, url: Url) -> reqwest::RequestBuilder {
        self.authorize(self.inner.http_client.delete(url))
    }

    pub(crate) fn risearch_url(&self) -> Url {
        self.inner.risearch_url.clone()
    }

    /// Returns `{base}/objects/{pid}/datastreams/{dsid}` followed by `tail`.
    pub(crate) fn datastream_url(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        tail: &[&str],
    ) -> AppResult<Url> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Configuration(format!(
                    "repository base url '{}' cannot carry path segments",
                    self.inner.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["objects", pid.as_str(), "datastreams", dsid.as_str()])
            .extend(tail);

        Ok(url)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(&self.inner.username, Some(&self.inner.password))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use dsretain_domain::{DatastreamId, ObjectPid};
    use url::Url;

    use super::{FedoraConnection, FedoraConnectionConfig};

    fn connection(base: &str) -> FedoraConnection {
        let base_url = Url::parse(base).unwrap_or_else(|_| unreachable!());
        FedoraConnection::new(FedoraConnectionConfig {
            risearch_url: base_url.clone(),
            base_url,
            username: "fedoraAdmin".to_owned(),
            password: "fedora".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn datastream_url_appends_segments() {
        let pid = ObjectPid::new("lat:1839_00").unwrap_or_else(|_| unreachable!());
        let dsid = DatastreamId::new("OBJ").unwrap_or_else(|_| unreachable!());

        for base in ["http://localhost:8080/fedora", "http://localhost:8080/fedora/"] {
            let url = connection(base).datastream_url(&pid, &dsid, &["history"]);
            assert!(url.is_ok());
            assert_eq!(
                url.unwrap_or_else(|_| unreachable!()).as_str(),
                "http://localhost:8080/fedora/objects/lat:1839_00/datastreams/OBJ/history"
            );
        }
    }

    #[test]
    fn non_base_url_is_rejected() {
        let base_url = Url::parse("mailto:admin@example.org").unwrap_or_else(|_| unreachable!());
        let connection = FedoraConnection::new(FedoraConnectionConfig {
            risearch_url: base_url.clone(),
            base_url,
            username: String::new(),
            password: String::new(),
            timeout: Duration::from_secs(5),
        });
        assert!(connection.is_err());
    }
}
