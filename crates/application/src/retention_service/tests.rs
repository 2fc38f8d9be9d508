use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use dsretain_core::{AppError, AppResult};
use dsretain_domain::{DatastreamId, ObjectPid, PurgeBoundary, RetentionPolicy, VersionRecord};

use crate::retention_ports::{
    FailureReason, PurgeMode, PurgeOutcome, PurgeReceipt, SkipReason, VersionHistorySource,
    VersionPurger,
};

use super::RetentionService;

#[derive(Default)]
struct FakeVersionStore {
    histories: Mutex<HashMap<(String, String), Vec<VersionRecord>>>,
    unreadable: HashSet<String>,
    reject_with: Option<u16>,
    unreachable_on_delete: bool,
    delete_requests: Mutex<Vec<(String, String, String)>>,
}

impl FakeVersionStore {
    async fn seed(&self, pid: &str, dsid: &str, dates: &[&str]) {
        let records = dates
            .iter()
            .enumerate()
            .map(|(index, date)| VersionRecord::new(index as u32 + 1, *date))
            .collect();
        self.histories
            .lock()
            .await
            .insert((pid.to_owned(), dsid.to_owned()), records);
    }
}

#[async_trait]
impl VersionHistorySource for FakeVersionStore {
    async fn get_versions(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
    ) -> AppResult<Vec<VersionRecord>> {
        if self.unreadable.contains(pid.as_str()) {
            return Err(AppError::Transport("connection reset".to_owned()));
        }

        Ok(self
            .histories
            .lock()
            .await
            .get(&(pid.as_str().to_owned(), dsid.as_str().to_owned()))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl VersionPurger for FakeVersionStore {
    async fn purge_versions_before(
        &self,
        pid: &ObjectPid,
        dsid: &DatastreamId,
        boundary: &PurgeBoundary,
    ) -> AppResult<PurgeReceipt> {
        self.delete_requests.lock().await.push((
            pid.as_str().to_owned(),
            dsid.as_str().to_owned(),
            boundary.as_str().to_owned(),
        ));

        if self.unreachable_on_delete {
            return Err(AppError::Transport("timed out".to_owned()));
        }

        if let Some(status) = self.reject_with {
            return Err(AppError::UpstreamStatus {
                status,
                message: "datastream is locked".to_owned(),
            });
        }

        let mut histories = self.histories.lock().await;
        let versions = histories
            .entry((pid.as_str().to_owned(), dsid.as_str().to_owned()))
            .or_default();
        let before = versions.len();
        versions.retain(|record| record.created.as_str() >= boundary.as_str());

        Ok(PurgeReceipt {
            status: 200,
            message: format!("purged {} versions", before - versions.len()),
        })
    }
}

fn build_service(store: Arc<FakeVersionStore>) -> RetentionService {
    RetentionService::new(store.clone(), store)
}

fn pid(raw: &str) -> ObjectPid {
    ObjectPid::new(raw).unwrap_or_else(|_| unreachable!())
}

fn dsid(raw: &str) -> DatastreamId {
    DatastreamId::new(raw).unwrap_or_else(|_| unreachable!())
}

fn keep(count: usize) -> RetentionPolicy {
    RetentionPolicy::new(count).unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn purge_sends_oldest_retained_timestamp_as_boundary() {
    let store = Arc::new(FakeVersionStore::default());
    store
        .seed("lat:1", "OBJ", &["2020-01-01", "2020-06-01", "2021-01-01"])
        .await;
    let service = build_service(store.clone());

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(1), PurgeMode::Apply)
        .await;

    assert_eq!(
        outcome,
        PurgeOutcome::Purged {
            deleted_estimate: 2,
            boundary: PurgeBoundary::new("2021-01-01"),
            store_message: "purged 2 versions".to_owned(),
            shares_boundary_timestamp: false,
        }
    );
    assert_eq!(
        *store.delete_requests.lock().await,
        vec![(
            "lat:1".to_owned(),
            "OBJ".to_owned(),
            "2021-01-01".to_owned()
        )]
    );
}

#[tokio::test]
async fn single_version_is_skipped_without_request() {
    let store = Arc::new(FakeVersionStore::default());
    store.seed("lat:1", "DC", &["2020-01-01"]).await;
    let service = build_service(store.clone());

    let outcome = service
        .purge(&pid("lat:1"), &dsid("DC"), keep(1), PurgeMode::Apply)
        .await;

    assert_eq!(
        outcome,
        PurgeOutcome::Skipped(SkipReason::NothingToPurge { total: 1 })
    );
    assert!(store.delete_requests.lock().await.is_empty());
}

#[tokio::test]
async fn history_within_policy_is_skipped() {
    let store = Arc::new(FakeVersionStore::default());
    store
        .seed("lat:1", "DC", &["2020-01-01", "2020-02-01", "2020-03-01"])
        .await;
    let service = build_service(store.clone());

    for count in [3, 4, 10] {
        let outcome = service
            .purge(&pid("lat:1"), &dsid("DC"), keep(count), PurgeMode::Apply)
            .await;
        assert_eq!(
            outcome,
            PurgeOutcome::Skipped(SkipReason::NothingToPurge { total: 3 })
        );
    }
    assert!(store.delete_requests.lock().await.is_empty());
}

#[tokio::test]
async fn repeated_purge_is_idempotent() {
    let store = Arc::new(FakeVersionStore::default());
    store
        .seed(
            "lat:1",
            "OBJ",
            &["2020-01-01", "2020-02-01", "2020-03-01", "2020-04-01"],
        )
        .await;
    let service = build_service(store.clone());

    let first = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(2), PurgeMode::Apply)
        .await;
    assert_eq!(first.as_str(), "purged");

    for _ in 0..2 {
        let again = service
            .purge(&pid("lat:1"), &dsid("OBJ"), keep(2), PurgeMode::Apply)
            .await;
        assert_eq!(
            again,
            PurgeOutcome::Skipped(SkipReason::NothingToPurge { total: 2 })
        );
    }
    assert_eq!(store.delete_requests.lock().await.len(), 1);
}

#[tokio::test]
async fn unreadable_history_is_reported_as_unavailable() {
    let store = Arc::new(FakeVersionStore {
        unreadable: HashSet::from(["lat:1".to_owned()]),
        ..FakeVersionStore::default()
    });
    let service = build_service(store.clone());

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(1), PurgeMode::Apply)
        .await;

    let PurgeOutcome::Failed(reason) = outcome else {
        panic!("expected failure");
    };
    assert_eq!(reason.as_str(), "history-unavailable");
    assert!(reason.detail().contains("connection reset"));
    assert!(store.delete_requests.lock().await.is_empty());
}

#[tokio::test]
async fn duplicate_version_numbers_make_history_unavailable() {
    let store = Arc::new(FakeVersionStore::default());
    store.histories.lock().await.insert(
        ("lat:1".to_owned(), "OBJ".to_owned()),
        vec![
            VersionRecord::new(1, "2020-01-01"),
            VersionRecord::new(1, "2020-02-01"),
        ],
    );
    let service = build_service(store);

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(1), PurgeMode::Apply)
        .await;

    assert!(matches!(
        outcome,
        PurgeOutcome::Failed(FailureReason::HistoryUnavailable(_))
    ));
}

#[tokio::test]
async fn rejected_delete_keeps_status() {
    let store = Arc::new(FakeVersionStore {
        reject_with: Some(409),
        ..FakeVersionStore::default()
    });
    store.seed("lat:1", "OBJ", &["2020-01-01", "2020-06-01"]).await;
    let service = build_service(store);

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(1), PurgeMode::Apply)
        .await;

    assert_eq!(
        outcome,
        PurgeOutcome::Failed(FailureReason::StoreRejected {
            status: 409,
            message: "datastream is locked".to_owned(),
        })
    );
}

#[tokio::test]
async fn delete_transport_error_becomes_failure() {
    let store = Arc::new(FakeVersionStore {
        unreachable_on_delete: true,
        ..FakeVersionStore::default()
    });
    store.seed("lat:1", "OBJ", &["2020-01-01", "2020-06-01"]).await;
    let service = build_service(store);

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(1), PurgeMode::Apply)
        .await;

    assert!(matches!(
        outcome,
        PurgeOutcome::Failed(FailureReason::Transport(_))
    ));
}

#[tokio::test]
async fn dry_run_reports_plan_without_request() {
    let store = Arc::new(FakeVersionStore::default());
    store
        .seed("lat:1", "OBJ", &["2020-01-01", "2020-06-01", "2021-01-01"])
        .await;
    let service = build_service(store.clone());

    let outcome = service
        .purge(&pid("lat:1"), &dsid("OBJ"), keep(2), PurgeMode::DryRun)
        .await;

    assert_eq!(
        outcome,
        PurgeOutcome::Skipped(SkipReason::DryRun {
            boundary: PurgeBoundary::new("2020-06-01"),
            would_delete: 1,
            shares_boundary_timestamp: false,
        })
    );
    assert!(store.delete_requests.lock().await.is_empty());
}
