//! Resource index query construction.

use dsretain_domain::{DatastreamId, ObjectPid};

const MEMBER_OF_COLLECTION: &str =
    "info:fedora/fedora-system:def/relations-external#isMemberOfCollection";
const DISSEMINATES: &str = "info:fedora/fedora-system:def/view#disseminates";

/// Builds the resource index query for objects under `root` exposing `dsid`.
///
/// Both identifiers are validated types whose character sets cannot close an
/// IRI or a string literal, so they are embedded directly.
#[must_use]
pub fn membership_query(dsid: &DatastreamId, root: &ObjectPid) -> String {
    format!(
        "SELECT DISTINCT ?x WHERE {{ \
         ?x <{MEMBER_OF_COLLECTION}>+ <{root_uri}> . \
         ?x <{DISSEMINATES}> ?ds . \
         FILTER contains(str(?ds), \"{dsid}\") }}",
        root_uri = root.resource_uri(),
        dsid = dsid.as_str(),
    )
}
