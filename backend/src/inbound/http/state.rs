//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureInventoryCommand, FixtureInventoryQuery, InventoryCommand, InventoryQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub inventory: Arc<dyn InventoryCommand>,
    pub inventory_query: Arc<dyn InventoryQuery>,
}

impl HttpState {
    /// Construct state from the inventory driving ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use inventory_backend::domain::ports::{FixtureInventoryCommand, FixtureInventoryQuery};
    /// use inventory_backend::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureInventoryCommand),
    ///     Arc::new(FixtureInventoryQuery),
    /// );
    /// let _query = state.inventory_query.clone();
    /// ```
    pub fn new(
        inventory: Arc<dyn InventoryCommand>,
        inventory_query: Arc<dyn InventoryQuery>,
    ) -> Self {
        Self {
            inventory,
            inventory_query,
        }
    }

    /// Build state from one value implementing both ports, such as
    /// [`crate::domain::InventoryService`].
    pub fn from_service<T>(service: Arc<T>) -> Self
    where
        T: InventoryCommand + InventoryQuery + 'static,
    {
        Self {
            inventory: service.clone(),
            inventory_query: service,
        }
    }
}

impl Default for HttpState {
    fn default() -> Self {
        Self::new(
            Arc::new(FixtureInventoryCommand),
            Arc::new(FixtureInventoryQuery),
        )
    }
}
