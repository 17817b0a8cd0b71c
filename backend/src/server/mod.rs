//! Server construction and middleware wiring.

mod config;
mod store;

pub use config::ServerConfig;
pub use store::{StartupError, build_store};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::InventoryService;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::inventory;
use crate::inbound::http::json_config;
use crate::inbound::http::state::HttpState;
use crate::middleware::{ApiKeyGate, Trace};

use std::sync::Arc;

/// Shared pieces cloned into every worker's [`App`].
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub api_key_gate: Option<ApiKeyGate>,
}

/// Assemble the application: health checks at the root, inventory under `/api/v1`
/// behind the API-key gate, and Swagger UI at `/docs` in debug builds.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        api_key_gate,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(api_key_gate.unwrap_or_else(ApiKeyGate::disabled))
        .configure(inventory::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        store,
        api_key_gate,
    } = config;
    let service = Arc::new(InventoryService::new(store));
    let http_state = web::Data::new(HttpState::from_service(service));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            api_key_gate: api_key_gate.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
