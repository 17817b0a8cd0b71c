//! Driven port owning the current-state and change-history views.

use async_trait::async_trait;
use chrono::Utc;

use super::define_port_error;
use crate::domain::inventory::{
    ChangeEvent, CurrentStateRecord, EndpointId, IdentityKey, InventoryKind, ReconcileCandidate,
    ReconcileOutcome, plan_reconciliation,
};

define_port_error! {
    /// Errors raised by inventory store adapters.
    pub enum InventoryStoreError {
        /// The store could not be reached (pool checkout, closed connection).
        Connection { message: String } =>
            "inventory store connection failed: {message}",
        /// A query or mutation failed for a non-transient reason.
        Query { message: String } =>
            "inventory store query failed: {message}",
        /// Lock or transaction contention persisted past the retry budget.
        Conflict { message: String } =>
            "inventory reconciliation conflicted: {message}",
    }
}

/// The only component allowed to mutate current state and change history.
///
/// Implementations serialise reconciliations per
/// `(node_id, kind, identity_key)` and perform each one atomically: either
/// `last_seen` is refreshed, or the current row is replaced and exactly one
/// change event is appended.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Reconcile one validated record against current state.
    async fn reconcile(
        &self,
        candidate: &ReconcileCandidate,
    ) -> Result<ReconcileOutcome, InventoryStoreError>;

    /// Current rows for one endpoint and kind, ordered by identity key.
    async fn current_state(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, InventoryStoreError>;

    /// Change events for one endpoint and kind, oldest first, optionally
    /// narrowed to one identity key.
    async fn change_history(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
        identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, InventoryStoreError>;
}

/// Fixture store that treats every record as newly created and keeps
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureInventoryStore;

#[async_trait]
impl InventoryStore for FixtureInventoryStore {
    async fn reconcile(
        &self,
        candidate: &ReconcileCandidate,
    ) -> Result<ReconcileOutcome, InventoryStoreError> {
        Ok(plan_reconciliation(candidate, None, Utc::now()).into_outcome(None))
    }

    async fn current_state(
        &self,
        _node_id: &EndpointId,
        _kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, InventoryStoreError> {
        Ok(Vec::new())
    }

    async fn change_history(
        &self,
        _node_id: &EndpointId,
        _kind: InventoryKind,
        _identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, InventoryStoreError> {
        Ok(Vec::new())
    }
}
