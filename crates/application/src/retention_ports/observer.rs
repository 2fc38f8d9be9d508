use dsretain_domain::{DatastreamId, ObjectPid};

use super::outcome::PurgeOutcome;
use super::run::{RetentionRunRequest, RunSummary};

/// Position of the current datastream within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatastreamProgress {
    /// 1-based datastream position.
    pub position: usize,
    /// Number of distinct datastreams in the run.
    pub total: usize,
}

/// Progress of object processing for one datastream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairProgress {
    /// Enclosing datastream position.
    pub datastream: DatastreamProgress,
    /// Pairs finished so far for this datastream, including the current one.
    pub completed: usize,
    /// Objects discovered for this datastream.
    pub total: usize,
}

/// Receives run progress events.
///
/// Events are emitted from a single fan-in loop, so `completed` counters
/// increase by exactly one per event even when pairs run concurrently.
pub trait RetentionRunObserver: Send + Sync {
    /// Called once before any discovery.
    fn run_started(&self, request: &RetentionRunRequest);

    /// Called before discovery for each datastream.
    fn datastream_started(&self, progress: DatastreamProgress, dsid: &DatastreamId);

    /// Called when the discovery query failed; the datastream is treated as empty.
    fn discovery_failed(&self, dsid: &DatastreamId, error: &str);

    /// Called with the number of distinct objects found, possibly zero.
    fn objects_discovered(&self, dsid: &DatastreamId, count: usize);

    /// Called after each object/datastream pair finishes.
    fn pair_finished(
        &self,
        progress: PairProgress,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        outcome: &PurgeOutcome,
    );

    /// Called once after all datastreams are processed.
    fn run_finished(&self, summary: &RunSummary);
}
