//! Inventory reconciliation and full-inventory orchestration service.
//!
//! Implements both driving ports on top of an [`InventoryStore`]:
//! - single-record submissions validate, reconcile and surface raw errors;
//! - full submissions reconcile every record in a stable order and collect a
//!   per-item report, never letting one item's failure abort its siblings;
//! - queries read the store's current-state and history views.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::domain::Error;
use crate::domain::inventory::{
    ChangeEvent, CurrentStateRecord, EndpointId, FullInventoryReport, FullInventorySubmission,
    IdentityKey, InventoryKind, InventoryRecord, InventoryValidationError, ItemReport, ItemStatus,
    ReconcileCandidate, ReconcileOutcome,
};
use crate::domain::ports::{InventoryCommand, InventoryQuery, InventoryStore, InventoryStoreError};

/// Domain service backing the inventory command and query ports.
pub struct InventoryService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for InventoryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ?Sized> InventoryService<S> {
    /// Create a service over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> InventoryService<S>
where
    S: InventoryStore + ?Sized,
{
    async fn reconcile_record(
        &self,
        node_id: &EndpointId,
        record: &InventoryRecord,
    ) -> Result<ReconcileOutcome, Error> {
        let candidate =
            ReconcileCandidate::new(node_id.clone(), record).map_err(map_validation_error)?;
        let outcome = self
            .store
            .reconcile(&candidate)
            .await
            .map_err(|err| map_store_error(&candidate, err))?;
        debug!(
            node_id = %outcome.node_id,
            kind = %outcome.kind,
            identity_key = %outcome.identity_key,
            change = outcome.classification.label(),
            "reconciled inventory record"
        );
        Ok(outcome)
    }

    async fn reconcile_item(&self, node_id: &EndpointId, record: &InventoryRecord) -> ItemReport {
        let identity_key = record
            .identity_key()
            .map_or_else(|_| record.raw_id().to_owned(), String::from);
        let status = match self.reconcile_record(node_id, record).await {
            Ok(outcome) => ItemStatus::Committed { outcome },
            Err(error) => ItemStatus::Failed { error },
        };
        ItemReport {
            kind: record.kind(),
            identity_key,
            status,
        }
    }
}

#[async_trait]
impl<S> InventoryCommand for InventoryService<S>
where
    S: InventoryStore + ?Sized,
{
    async fn submit(
        &self,
        node_id: EndpointId,
        record: InventoryRecord,
    ) -> Result<ReconcileOutcome, Error> {
        self.reconcile_record(&node_id, &record).await
    }

    async fn submit_full(
        &self,
        submission: FullInventorySubmission,
    ) -> Result<FullInventoryReport, Error> {
        let node_id = submission.node_id.clone();
        let decoded = submission.into_items();
        let mut items = Vec::with_capacity(decoded.len());

        for item in decoded {
            let report = match item {
                Ok(record) => self.reconcile_item(&node_id, &record).await,
                Err(undecoded) => {
                    debug!(
                        node_id = %node_id,
                        kind = %undecoded.kind,
                        raw_id = %undecoded.raw_id,
                        error = %undecoded.error,
                        "full inventory item failed to decode"
                    );
                    ItemReport {
                        kind: undecoded.kind,
                        status: ItemStatus::Failed {
                            error: map_decode_error(
                                &format!("{} record", undecoded.kind),
                                &undecoded.error,
                            ),
                        },
                        identity_key: undecoded.raw_id,
                    }
                }
            };
            items.push(report);
        }

        let report = FullInventoryReport::new(node_id, items);
        if !report.success {
            warn!(
                node_id = %report.node_id,
                failed = report.failures().count(),
                total = report.items.len(),
                "full inventory submission partially failed"
            );
        }
        Ok(report)
    }
}

#[async_trait]
impl<S> InventoryQuery for InventoryService<S>
where
    S: InventoryStore + ?Sized,
{
    async fn current_state(
        &self,
        node_id: EndpointId,
        kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, Error> {
        self.store
            .current_state(&node_id, kind)
            .await
            .map_err(map_read_error)
    }

    async fn change_history(
        &self,
        node_id: EndpointId,
        kind: InventoryKind,
        identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, Error> {
        self.store
            .change_history(&node_id, kind, identity_key)
            .await
            .map_err(map_read_error)
    }
}

/// Map a validation failure to `invalid_request`, naming the field.
pub fn map_validation_error(err: InventoryValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Map a record decode failure to `invalid_request`.
///
/// Serde reports missing fields as ``missing field `name` ``; when that shape
/// is recognised the field is named in the details.
pub fn map_decode_error(subject: &str, err: &serde_json::Error) -> Error {
    let reason = err.to_string();
    let details = match missing_field_name(&reason) {
        Some(field) => json!({ "field": field, "code": "missing_field" }),
        None => json!({ "code": "malformed_record" }),
    };
    Error::invalid_request(format!("invalid {subject}: {reason}")).with_details(details)
}

fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

fn map_store_error(candidate: &ReconcileCandidate, err: InventoryStoreError) -> Error {
    match err {
        InventoryStoreError::Conflict { message } => {
            warn!(
                node_id = %candidate.node_id,
                kind = %candidate.kind(),
                identity_key = %candidate.identity_key(),
                %message,
                "reconciliation gave up under contention"
            );
            Error::conflict("inventory record is being updated concurrently; retry the submission")
        }
        other => {
            error!(
                node_id = %candidate.node_id,
                kind = %candidate.kind(),
                identity_key = %candidate.identity_key(),
                error = %other,
                "reconciliation failed"
            );
            map_read_error(other)
        }
    }
}

fn map_read_error(err: InventoryStoreError) -> Error {
    match err {
        InventoryStoreError::Connection { message } => {
            Error::service_unavailable(format!("inventory store unavailable: {message}"))
        }
        InventoryStoreError::Query { message } => {
            Error::internal(format!("inventory store error: {message}"))
        }
        InventoryStoreError::Conflict { message } => Error::conflict(message),
    }
}

#[cfg(test)]
#[path = "inventory_service_tests.rs"]
mod tests;
