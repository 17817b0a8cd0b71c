//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::ports::InventoryStore;
use crate::middleware::ApiKeyGate;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) store: Arc<dyn InventoryStore>,
    pub(crate) api_key_gate: Option<ApiKeyGate>,
}

impl ServerConfig {
    /// Serve `store` on `bind_addr`.
    ///
    /// Without [`ServerConfig::with_api_key_gate`] the API is left open, which
    /// start-up only allows in debug builds.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, store: Arc<dyn InventoryStore>) -> Self {
        Self {
            bind_addr,
            store,
            api_key_gate: None,
        }
    }

    /// Require the shared API key on `/api/v1`.
    #[must_use]
    pub fn with_api_key_gate(mut self, gate: ApiKeyGate) -> Self {
        self.api_key_gate = Some(gate);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
