//! Behavioural coverage for the in-process inventory store.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::inventory::{
    ChangeType, Classification, HardwareRecord, InventoryRecord, SoftwareRecord,
};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

#[fixture]
fn store() -> InMemoryInventoryStore {
    InMemoryInventoryStore::new(
        Arc::new(FixtureClock {
            utc_now: fixture_timestamp(),
        }),
        ReconcilePolicy::default(),
    )
}

fn node(id: &str) -> EndpointId {
    EndpointId::new(id).expect("valid node")
}

fn disk(node_id: &str, capacity: u32) -> ReconcileCandidate {
    let record = InventoryRecord::Hardware(HardwareRecord {
        id: "H1".into(),
        name: "DiskA".into(),
        component_type: "ssd".into(),
        manufacturer: Some("Acme".into()),
        specifications: json!({"capacity_gb": capacity}),
    });
    ReconcileCandidate::new(node(node_id), &record).expect("valid candidate")
}

fn software(version: &str) -> ReconcileCandidate {
    let record = InventoryRecord::Software(SoftwareRecord {
        id: "S1".into(),
        name: "Editor".into(),
        version: version.into(),
        license_key: None,
    });
    ReconcileCandidate::new(node("node-1"), &record).expect("valid candidate")
}

#[rstest]
#[tokio::test]
async fn identical_resubmission_is_unchanged(store: InMemoryInventoryStore) {
    let first = store.reconcile(&disk("node-1", 512)).await.expect("first");
    let second = store.reconcile(&disk("node-1", 512)).await.expect("second");

    assert_eq!(first.classification, Classification::Created);
    assert_eq!(second.classification, Classification::Unchanged);
    assert_eq!(second.event_sequence, None);

    let history = store
        .change_history(&node("node-1"), InventoryKind::Hardware, None)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
}

#[rstest]
#[tokio::test]
async fn changed_payload_updates_current_and_appends_history(store: InMemoryInventoryStore) {
    store.reconcile(&disk("node-1", 512)).await.expect("create");
    let updated = store.reconcile(&disk("node-1", 1024)).await.expect("update");

    assert_eq!(
        updated.classification,
        Classification::Updated {
            changed_fields: vec!["specifications.capacity_gb".to_owned()],
        }
    );

    let current = store
        .current_state(&node("node-1"), InventoryKind::Hardware)
        .await
        .expect("current");
    assert_eq!(current.len(), 1);
    assert_eq!(
        current[0].payload.as_value()["specifications"]["capacity_gb"],
        json!(1024)
    );

    let history = store
        .change_history(
            &node("node-1"),
            InventoryKind::Hardware,
            Some(IdentityKey::new("H1").expect("key")),
        )
        .await
        .expect("history");
    let types: Vec<_> = history.iter().map(|event| event.change_type).collect();
    assert_eq!(types, vec![ChangeType::Created, ChangeType::Updated]);
    assert!(history[0].sequence < history[1].sequence);
    assert_eq!(history[1].previous_payload.as_ref(), Some(&history[0].new_payload));
}

#[rstest]
#[tokio::test]
async fn software_upgrade_is_an_update(store: InMemoryInventoryStore) {
    store.reconcile(&software("1.0")).await.expect("create");
    let outcome = store.reconcile(&software("1.1")).await.expect("upgrade");

    assert_eq!(outcome.payload.as_value()["version"], json!("1.1"));
    assert!(matches!(outcome.classification, Classification::Updated { .. }));
}

#[rstest]
#[tokio::test]
async fn endpoints_do_not_share_partitions(store: InMemoryInventoryStore) {
    let a = store.reconcile(&disk("node-a", 512)).await.expect("node a");
    let b = store.reconcile(&disk("node-b", 512)).await.expect("node b");

    assert_eq!(a.classification, Classification::Created);
    assert_eq!(b.classification, Classification::Created);
    for id in ["node-a", "node-b"] {
        let rows = store
            .current_state(&node(id), InventoryKind::Hardware)
            .await
            .expect("current");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].node_id, node(id));
    }
}

#[rstest]
#[tokio::test]
async fn lock_wait_timeout_is_a_conflict() {
    let store = InMemoryInventoryStore::new(
        Arc::new(DefaultClock),
        ReconcilePolicy::new(None, Some(10)),
    );
    let candidate = disk("node-1", 512);
    let key = (
        candidate.node_id.clone(),
        candidate.kind(),
        candidate.identity_key().clone(),
    );
    let lock = store.partition_lock(&key).await;
    let _held = lock.lock().await;

    let err = store.reconcile(&candidate).await.expect_err("lock held");
    assert!(matches!(err, InventoryStoreError::Conflict { .. }));
    assert_eq!(store.tracked_partitions().await, 1, "held lock stays tracked");
}

#[rstest]
#[tokio::test]
async fn settled_partitions_are_not_retained(store: InMemoryInventoryStore) {
    for index in 0..32 {
        store
            .reconcile(&disk(&format!("node-{index}"), 512))
            .await
            .expect("reconcile");
    }
    store
        .reconcile(&disk("node-0", 1024))
        .await
        .expect("update");

    assert_eq!(store.tracked_partitions().await, 0);
    let current = store
        .current_state(&node("node-0"), InventoryKind::Hardware)
        .await
        .expect("current");
    assert_eq!(current[0].payload.as_value()["specifications"]["capacity_gb"], json!(1024));
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_distinct_payloads_all_land_in_history() {
    const WRITERS: u32 = 16;
    let store = Arc::new(InMemoryInventoryStore::new(
        Arc::new(DefaultClock),
        ReconcilePolicy::new(None, Some(10_000)),
    ));

    let tasks: Vec<_> = (0..WRITERS)
        .map(|capacity| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.reconcile(&disk("node-1", capacity)).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("task joins").expect("reconcile succeeds");
    }

    let history = store
        .change_history(&node("node-1"), InventoryKind::Hardware, None)
        .await
        .expect("history");
    assert_eq!(history.len(), WRITERS as usize);
    assert_eq!(
        history
            .iter()
            .filter(|event| event.change_type == ChangeType::Created)
            .count(),
        1
    );

    let last = history.iter().max_by_key(|event| event.sequence).expect("events");
    let current = store
        .current_state(&node("node-1"), InventoryKind::Hardware)
        .await
        .expect("current");
    assert_eq!(current[0].payload, last.new_payload);

    // Each event builds on the one before it: no update was lost.
    let mut by_sequence = history.clone();
    by_sequence.sort_by_key(|event| event.sequence);
    for pair in by_sequence.windows(2) {
        assert_eq!(pair[1].previous_payload.as_ref(), Some(&pair[0].new_payload));
    }
    assert_eq!(store.tracked_partitions().await, 0);
}
