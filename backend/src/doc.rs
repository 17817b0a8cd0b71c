//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the inventory submission and query endpoints plus the health
//!   checks
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//! - **Security**: the shared `X-API-Key` header scheme
//!
//! The generated specification is served by Swagger UI in debug builds.

use crate::inbound::http::schemas::{
    ChangeEventSchema, ChangeTypeSchema, CurrentStateRecordSchema, ErrorCodeSchema, ErrorSchema,
    FullInventoryReportSchema, FullInventorySubmissionSchema, InventoryKindSchema,
    InventorySubmissionSchema, ItemReportSchema, ReconcileOutcomeSchema,
};
use crate::middleware::API_KEY_HEADER;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the API key security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                API_KEY_HEADER,
                "Shared secret configured via INVENTORY_API_KEY.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Endpoint inventory API",
        description = "Ingests endpoint inventory snapshots and serves current state and change history."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("ApiKey" = [])),
    paths(
        crate::inbound::http::inventory::submit_full_inventory,
        crate::inbound::http::inventory::submit_inventory,
        crate::inbound::http::inventory::get_current_state,
        crate::inbound::http::inventory::get_change_history,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        InventoryKindSchema,
        ChangeTypeSchema,
        ReconcileOutcomeSchema,
        CurrentStateRecordSchema,
        ChangeEventSchema,
        ItemReportSchema,
        FullInventoryReportSchema,
        InventorySubmissionSchema,
        FullInventorySubmissionSchema,
    )),
    tags(
        (name = "inventory", description = "Inventory submission and history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI document structure.

    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const OUTCOME_SCHEMA_NAME: &str = "crate.domain.inventory.ReconcileOutcome";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_outcome_schema_exposes_the_classification() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let outcome = schemas.get(OUTCOME_SCHEMA_NAME).expect("outcome schema");

        assert_object_schema_has_field(outcome, "change");
        assert_object_schema_has_field(outcome, "identityKey");
    }

    #[test]
    fn openapi_lists_every_inventory_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/inventory/full",
            "/api/v1/inventory/{kind}",
            "/api/v1/inventory/{kind}/{node_id}",
            "/api/v1/inventory/{kind}/{node_id}/history",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn openapi_declares_the_api_key_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("ApiKey"));
    }
}
