use std::collections::BTreeSet;
use std::sync::Arc;

use dsretain_domain::{DatastreamId, ObjectPid};

use crate::retention_ports::ObjectIndex;

/// Distinct objects found for one datastream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiscoveredObjects {
    pids: BTreeSet<ObjectPid>,
    failure: Option<String>,
}

impl DiscoveredObjects {
    /// Returns the distinct object identifiers.
    #[must_use]
    pub fn pids(&self) -> &BTreeSet<ObjectPid> {
        &self.pids
    }

    /// Consumes the result and returns the identifiers.
    #[must_use]
    pub fn into_pids(self) -> BTreeSet<ObjectPid> {
        self.pids
    }

    /// Returns the query failure when discovery failed open.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Returns true when no object needs processing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

/// Object discovery with fail-open semantics.
#[derive(Clone)]
pub struct DiscoveryService {
    index: Arc<dyn ObjectIndex>,
}

impl DiscoveryService {
    /// Creates a discovery service.
    #[must_use]
    pub fn new(index: Arc<dyn ObjectIndex>) -> Self {
        Self { index }
    }

    /// Finds objects under `root` exposing `dsid`.
    ///
    /// A failed query yields an empty set with the failure attached, so one
    /// datastream's discovery never aborts a run.
    pub async fn find_objects(&self, dsid: &DatastreamId, root: &ObjectPid) -> DiscoveredObjects {
        match self.index.find_objects(dsid, root).await {
            Ok(pids) => DiscoveredObjects {
                pids: pids.into_iter().collect(),
                failure: None,
            },
            Err(error) => DiscoveredObjects {
                pids: BTreeSet::new(),
                failure: Some(error.to_string()),
            },
        }
    }
}
