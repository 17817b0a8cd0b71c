//! In-process inventory store.
//!
//! Serves deployments without a database and the HTTP integration tests.
//! Each `(node_id, kind, identity_key)` partition has its own async mutex;
//! acquisition is bounded by the configured lock timeout and expiry yields
//! [`InventoryStoreError::Conflict`]. State is held in ordered maps so reads
//! come back in identity-key and sequence order without sorting.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::ReconcilePolicy;
use crate::domain::inventory::{
    ChangeEvent, CurrentStateRecord, EndpointId, IdentityKey, InventoryKind, ReconcileCandidate,
    ReconcileOutcome, ReconciliationPlan, plan_reconciliation,
};
use crate::domain::ports::{InventoryStore, InventoryStoreError};

type PartitionKey = (EndpointId, InventoryKind, IdentityKey);

#[derive(Default)]
struct Tables {
    current: BTreeMap<PartitionKey, CurrentStateRecord>,
    changes: BTreeMap<PartitionKey, Vec<ChangeEvent>>,
    next_sequence: i64,
}

/// [`InventoryStore`] backed by process memory.
pub struct InMemoryInventoryStore {
    clock: Arc<dyn Clock>,
    policy: ReconcilePolicy,
    partitions: Mutex<HashMap<PartitionKey, Arc<Mutex<()>>>>,
    tables: Mutex<Tables>,
}

impl InMemoryInventoryStore {
    /// Create an empty store.
    pub fn new(clock: Arc<dyn Clock>, policy: ReconcilePolicy) -> Self {
        Self {
            clock,
            policy,
            partitions: Mutex::new(HashMap::new()),
            tables: Mutex::new(Tables {
                next_sequence: 1,
                ..Tables::default()
            }),
        }
    }

    async fn partition_lock(&self, key: &PartitionKey) -> Arc<Mutex<()>> {
        let mut partitions = self.partitions.lock().await;
        Arc::clone(partitions.entry(key.clone()).or_default())
    }

    /// Drop the partition's lock entry once no other caller holds or awaits
    /// it, so the map only tracks partitions with writers in flight.
    async fn release_partition(&self, key: &PartitionKey, lock: Arc<Mutex<()>>) {
        let mut partitions = self.partitions.lock().await;
        // One reference in the map plus `lock`; clones are only taken under
        // the map's mutex, so the count cannot grow while it is held.
        if Arc::strong_count(&lock) == 2 {
            partitions.remove(key);
        }
    }

    #[cfg(test)]
    async fn tracked_partitions(&self) -> usize {
        self.partitions.lock().await.len()
    }

    async fn apply(&self, candidate: &ReconcileCandidate, key: PartitionKey) -> ReconcileOutcome {
        let existing = self.tables.lock().await.current.get(&key).cloned();
        let plan = plan_reconciliation(candidate, existing.as_ref(), self.clock.utc());

        let mut tables = self.tables.lock().await;
        let sequence = match &plan {
            ReconciliationPlan::Touch { current } => {
                tables.current.insert(key, current.clone());
                None
            }
            ReconciliationPlan::Commit { current, event, .. } => {
                let sequence = tables.next_sequence;
                tables.next_sequence += 1;
                tables.current.insert(key.clone(), current.clone());
                let (node_id, kind, identity_key) = key.clone();
                tables
                    .changes
                    .entry(key)
                    .or_default()
                    .push(event.clone().into_event(sequence, node_id, kind, identity_key));
                Some(sequence)
            }
        };
        plan.into_outcome(sequence)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn reconcile(
        &self,
        candidate: &ReconcileCandidate,
    ) -> Result<ReconcileOutcome, InventoryStoreError> {
        let key = (
            candidate.node_id.clone(),
            candidate.kind(),
            candidate.identity_key().clone(),
        );
        let lock = self.partition_lock(&key).await;
        let result = match tokio::time::timeout(self.policy.lock_timeout(), lock.lock()).await {
            Ok(_guard) => Ok(self.apply(candidate, key.clone()).await),
            Err(_) => {
                warn!(
                    node_id = %key.0,
                    kind = %key.1,
                    identity_key = %key.2,
                    "timed out waiting for partition lock"
                );
                Err(InventoryStoreError::conflict(format!(
                    "lock wait exceeded {} ms",
                    self.policy.lock_timeout().as_millis()
                )))
            }
        };
        self.release_partition(&key, lock).await;
        result
    }

    async fn current_state(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, InventoryStoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .current
            .iter()
            .filter(|((node, row_kind, _), _)| node == node_id && *row_kind == kind)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn change_history(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
        identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, InventoryStoreError> {
        let tables = self.tables.lock().await;
        let mut events: Vec<ChangeEvent> = tables
            .changes
            .iter()
            .filter(|((node, row_kind, key), _)| {
                node == node_id
                    && *row_kind == kind
                    && identity_key.as_ref().is_none_or(|wanted| wanted == key)
            })
            .flat_map(|(_, events)| events.iter().cloned())
            .collect();
        events.sort_by(|a, b| {
            a.detected_at
                .cmp(&b.detected_at)
                .then(a.sequence.cmp(&b.sequence))
        });
        Ok(events)
    }
}

#[cfg(test)]
mod tests;
