//! Driving port for inventory submissions.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::inventory::{
    EndpointId, FullInventoryReport, FullInventorySubmission, InventoryRecord, ReconcileCandidate,
    ReconcileOutcome, plan_reconciliation,
};

/// Driving port used by the HTTP adapter to submit inventory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryCommand: Send + Sync {
    /// Reconcile a single record for `node_id`.
    ///
    /// Validation failures surface as `invalid_request`, contention as
    /// `conflict` and store outages as `service_unavailable`.
    async fn submit(
        &self,
        node_id: EndpointId,
        record: InventoryRecord,
    ) -> Result<ReconcileOutcome, Error>;

    /// Reconcile every record of a full submission, isolating failures per
    /// item.
    async fn submit_full(
        &self,
        submission: FullInventorySubmission,
    ) -> Result<FullInventoryReport, Error>;
}

/// Fixture command that validates input and reports everything as created.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureInventoryCommand;

#[async_trait]
impl InventoryCommand for FixtureInventoryCommand {
    async fn submit(
        &self,
        node_id: EndpointId,
        record: InventoryRecord,
    ) -> Result<ReconcileOutcome, Error> {
        let candidate = ReconcileCandidate::new(node_id, &record)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(plan_reconciliation(&candidate, None, chrono::Utc::now()).into_outcome(None))
    }

    async fn submit_full(
        &self,
        submission: FullInventorySubmission,
    ) -> Result<FullInventoryReport, Error> {
        Ok(FullInventoryReport::new(submission.node_id, Vec::new()))
    }
}
