//! Application services and ports.

#![forbid(unsafe_code)]

mod discovery_service;
mod retention_ports;
mod retention_runner;
mod retention_service;

pub use discovery_service::{DiscoveredObjects, DiscoveryService};
pub use retention_ports::{
    DatastreamProgress, FailureReason, ObjectIndex, PairProgress, PurgeMode, PurgeOutcome,
    PurgeReceipt, RetentionRunObserver, RetentionRunRequest, RunSummary, SkipReason,
    VersionHistorySource, VersionPurger,
};
pub use retention_runner::RetentionRunner;
pub use retention_service::RetentionService;
