use std::sync::Arc;

use dsretain_domain::DatastreamId;
use futures::stream::{self, StreamExt};

use crate::discovery_service::DiscoveryService;
use crate::retention_ports::{
    DatastreamProgress, PairProgress, RetentionRunObserver, RetentionRunRequest, RunSummary,
};
use crate::retention_service::RetentionService;

/// Runs retention across every datastream and discovered object.
///
/// Pairs are independent: each outcome is recorded and the run always
/// continues with the next pair.
#[derive(Clone)]
pub struct RetentionRunner {
    discovery_service: DiscoveryService,
    retention_service: RetentionService,
    observer: Arc<dyn RetentionRunObserver>,
    concurrency: usize,
}

impl RetentionRunner {
    /// Creates a sequential runner.
    #[must_use]
    pub fn new(
        discovery_service: DiscoveryService,
        retention_service: RetentionService,
        observer: Arc<dyn RetentionRunObserver>,
    ) -> Self {
        Self {
            discovery_service,
            retention_service,
            observer,
            concurrency: 1,
        }
    }

    /// Allows up to `concurrency` pairs of one datastream in flight.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Executes one run and returns its summary.
    pub async fn run(&self, request: &RetentionRunRequest) -> RunSummary {
        let mut summary = RunSummary::start();
        let datastream_ids = request.distinct_datastream_ids();
        summary.datastreams = datastream_ids.len();

        self.observer.run_started(request);

        for (index, dsid) in datastream_ids.iter().enumerate() {
            let progress = DatastreamProgress {
                position: index + 1,
                total: datastream_ids.len(),
            };
            self.run_datastream(request, progress, dsid, &mut summary)
                .await;
        }

        summary.finish();
        self.observer.run_finished(&summary);
        summary
    }

    async fn run_datastream(
        &self,
        request: &RetentionRunRequest,
        progress: DatastreamProgress,
        dsid: &DatastreamId,
        summary: &mut RunSummary,
    ) {
        self.observer.datastream_started(progress, dsid);

        let discovered = self
            .discovery_service
            .find_objects(dsid, &request.root)
            .await;
        if let Some(failure) = discovered.failure() {
            summary.failed_discoveries = summary.failed_discoveries.saturating_add(1);
            self.observer.discovery_failed(dsid, failure);
        }

        let pids = discovered.into_pids();
        self.observer.objects_discovered(dsid, pids.len());
        if pids.is_empty() {
            summary.datastreams_without_objects =
                summary.datastreams_without_objects.saturating_add(1);
            return;
        }

        let total = pids.len();
        let policy = request.policy;
        let mode = request.mode;
        let retention_service = &self.retention_service;

        let mut outcomes = stream::iter(pids)
            .map(|pid| async move {
                let outcome = retention_service.purge(&pid, dsid, policy, mode).await;
                (pid, outcome)
            })
            .buffer_unordered(self.concurrency);

        let mut completed = 0_usize;
        while let Some((pid, outcome)) = outcomes.next().await {
            completed += 1;
            summary.record(&outcome);
            self.observer.pair_finished(
                PairProgress {
                    datastream: progress,
                    completed,
                    total,
                },
                &pid,
                dsid,
                &outcome,
            );
        }
    }
}
