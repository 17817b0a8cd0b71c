//! Driving port for reading current state and change history.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::inventory::{
    ChangeEvent, CurrentStateRecord, EndpointId, IdentityKey, InventoryKind,
};

/// Read-side port consumed by the dashboard endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryQuery: Send + Sync {
    /// Current rows for one endpoint and kind.
    async fn current_state(
        &self,
        node_id: EndpointId,
        kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, Error>;

    /// Change history for one endpoint and kind.
    async fn change_history(
        &self,
        node_id: EndpointId,
        kind: InventoryKind,
        identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, Error>;
}

/// Fixture query returning empty views.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureInventoryQuery;

#[async_trait]
impl InventoryQuery for FixtureInventoryQuery {
    async fn current_state(
        &self,
        _node_id: EndpointId,
        _kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, Error> {
        Ok(Vec::new())
    }

    async fn change_history(
        &self,
        _node_id: EndpointId,
        _kind: InventoryKind,
        _identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, Error> {
        Ok(Vec::new())
    }
}
