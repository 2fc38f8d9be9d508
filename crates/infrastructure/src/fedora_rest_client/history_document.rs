use dsretain_core::{AppError, AppResult};
use dsretain_domain::{VersionRecord, parse_version_number};
use serde::Deserialize;

/// Namespace of repository management documents.
const MANAGEMENT_NAMESPACE: &str = "http://www.fedora.info/definitions/1/0/management/";

#[derive(Debug, Deserialize)]
struct DatastreamHistoryDocument {
    #[serde(rename = "@xmlns", default)]
    namespace: Option<String>,
    #[serde(rename = "datastreamProfile", default)]
    profiles: Vec<DatastreamProfileElement>,
}

#[derive(Debug, Deserialize)]
struct DatastreamProfileElement {
    #[serde(rename = "dsVersionID")]
    version_id: String,
    #[serde(rename = "dsCreateDate")]
    create_date: String,
}

/// Parses a datastream history document into version records.
///
/// Records keep document order; only the numeric suffix of each
/// `dsVersionID` is retained.
pub(crate) fn parse_history_document(xml: &str) -> AppResult<Vec<VersionRecord>> {
    let document = quick_xml::de::from_str::<DatastreamHistoryDocument>(xml).map_err(|error| {
        AppError::MalformedResponse(format!("failed to parse datastream history: {error}"))
    })?;

    if let Some(namespace) = document.namespace.as_deref()
        && namespace != MANAGEMENT_NAMESPACE
    {
        return Err(AppError::MalformedResponse(format!(
            "datastream history uses unexpected namespace '{namespace}'"
        )));
    }

    document
        .profiles
        .into_iter()
        .map(|profile| {
            let created = profile.create_date.trim();
            if created.is_empty() {
                return Err(AppError::MalformedResponse(format!(
                    "version '{}' has an empty creation date",
                    profile.version_id
                )));
            }

            Ok(VersionRecord::new(
                parse_version_number(profile.version_id.trim())?,
                created,
            ))
        })
        .collect()
}
