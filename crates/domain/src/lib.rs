//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod identifiers;
mod retention;
mod version;

pub use identifiers::{DatastreamId, ObjectPid};
pub use retention::{PurgeBoundary, PurgePlan, RetentionDecision, RetentionPolicy};
pub use version::{VersionHistory, VersionRecord, parse_version_number};
