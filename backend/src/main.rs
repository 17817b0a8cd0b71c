//! Service entry-point: loads settings, selects the inventory store and serves
//! the REST API, health checks and (in debug builds) the OpenAPI docs.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use inventory_backend::inbound::http::health::HealthState;
use inventory_backend::middleware::ApiKeyGate;
use inventory_backend::server::{ServerConfig, StartupError, build_store, create_server};
use inventory_backend::settings::InventorySettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = InventorySettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(StartupError::from)?;
    let api_key = settings.require_api_key().map_err(StartupError::from)?;

    let store = build_store(&settings, Arc::new(DefaultClock)).await?;
    let mut config = ServerConfig::new(bind_addr, store);
    match api_key {
        Some(key) => config = config.with_api_key_gate(ApiKeyGate::new(key)),
        None => warn!("INVENTORY_API_KEY not set; /api/v1 accepts unauthenticated requests"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "inventory service listening");
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
