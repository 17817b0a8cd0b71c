//! Inventory store selection at start-up.
//!
//! A configured database URL selects PostgreSQL: pending migrations are
//! applied, then a pool is built. Without one the in-memory store is used.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::InventoryStore;
use crate::outbound::persistence::{
    DbPool, DieselInventoryStore, MigrationError, PoolConfig, PoolError, run_pending_migrations,
};
use crate::outbound::InMemoryInventoryStore;
use crate::settings::{InventorySettings, SettingsError};

/// Failures that stop the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Migration(#[from] MigrationError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl From<StartupError> for std::io::Error {
    fn from(value: StartupError) -> Self {
        std::io::Error::other(value.to_string())
    }
}

/// Build the store described by `settings`.
///
/// # Errors
/// Returns [`StartupError`] when migrations fail or the pool cannot be built.
pub async fn build_store(
    settings: &InventorySettings,
    clock: Arc<dyn Clock>,
) -> Result<Arc<dyn InventoryStore>, StartupError> {
    let policy = settings.reconcile_policy();
    match settings.database_url() {
        Some(url) => {
            run_pending_migrations(url).await?;
            let pool =
                DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_max_size())).await?;
            info!(
                max_connections = settings.pool_max_size(),
                max_attempts = policy.max_attempts(),
                "using PostgreSQL inventory store"
            );
            Ok(Arc::new(DieselInventoryStore::new(pool, clock, policy)))
        }
        None => {
            warn!("INVENTORY_DATABASE_URL not set; inventory is kept in memory only");
            Ok(Arc::new(InMemoryInventoryStore::new(clock, policy)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::{EndpointId, InventoryKind};
    use mockable::DefaultClock;

    #[tokio::test]
    async fn missing_database_url_selects_the_memory_store() {
        let settings = InventorySettings {
            bind_addr: None,
            database_url: Some("  ".to_owned()),
            api_key: None,
            pool_max_size: None,
            reconcile_max_attempts: None,
            lock_timeout_ms: None,
        };
        let store = build_store(&settings, Arc::new(DefaultClock))
            .await
            .expect("memory store needs no I/O");
        let node = EndpointId::new("WS-1").expect("endpoint");
        let rows = store
            .current_state(&node, InventoryKind::System)
            .await
            .expect("empty read");
        assert!(rows.is_empty());
    }

    #[test]
    fn startup_errors_become_io_errors() {
        let err: std::io::Error = StartupError::from(SettingsError::MissingApiKey).into();
        assert_eq!(err.to_string(), "INVENTORY_API_KEY must be set");
    }
}
