//! Inventory HTTP handlers.
//!
//! ```text
//! POST /api/v1/inventory/full
//! POST /api/v1/inventory/{kind}
//! GET  /api/v1/inventory/{kind}/{node_id}
//! GET  /api/v1/inventory/{kind}/{node_id}/history?identityKey=
//! ```
//!
//! `full` is registered ahead of `{kind}` so the literal segment wins.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;
use serde_json::{Map, Value};
use utoipa::IntoParams;

use crate::domain::{Error, map_decode_error};
use crate::domain::inventory::{
    Classification, EndpointId, FullInventorySubmission, InventoryKind, InventoryRecord,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    ChangeEventSchema, CurrentStateRecordSchema, ErrorSchema, FullInventoryReportSchema,
    FullInventorySubmissionSchema, InventorySubmissionSchema, ReconcileOutcomeSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_endpoint_id, parse_kind, parse_optional_identity_key,
};

const NODE_ID: FieldName = FieldName::new("nodeId");

/// Read views change on every submission; clients must revalidate.
const READ_CACHE_CONTROL: (&str, &str) = ("Cache-Control", "private, no-cache, must-revalidate");

#[derive(Debug, Deserialize)]
struct KindPath {
    kind: String,
}

#[derive(Debug, Deserialize)]
struct EndpointPath {
    kind: String,
    node_id: String,
}

/// Query parameters for change history.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Restrict the history to one identity key.
    pub identity_key: Option<String>,
}

/// Split `{ "nodeId": ..., ...record }` into the endpoint and the record body.
fn split_envelope(body: Value) -> Result<(EndpointId, Value), Error> {
    let Value::Object(mut fields) = body else {
        return Err(Error::invalid_request("request body must be a JSON object"));
    };
    let node_id = take_node_id(&mut fields)?;
    Ok((node_id, Value::Object(fields)))
}

fn take_node_id(fields: &mut Map<String, Value>) -> Result<EndpointId, Error> {
    // Older agents send snake_case.
    let raw = fields
        .remove("nodeId")
        .or_else(|| fields.remove("node_id"))
        .ok_or_else(|| missing_field_error(NODE_ID))?;
    match raw {
        Value::String(value) => parse_endpoint_id(&value, NODE_ID),
        _ => Err(missing_field_error(NODE_ID)),
    }
}

fn parse_record(kind: InventoryKind, body: Value) -> Result<InventoryRecord, Error> {
    InventoryRecord::from_json(kind, body)
        .map_err(|err| map_decode_error(&format!("{kind} record"), &err))
}

fn parse_full_submission(body: Value) -> Result<FullInventorySubmission, Error> {
    serde_json::from_value(body).map_err(|err| map_decode_error("full inventory", &err))
}

fn status_for(classification: &Classification) -> StatusCode {
    match classification {
        Classification::Created => StatusCode::CREATED,
        Classification::Unchanged | Classification::Updated { .. } => StatusCode::OK,
    }
}

/// Reconcile a complete endpoint inventory.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/full",
    description = "Reconcile every record of one endpoint. Each record commits or fails \
        independently; the report lists both.",
    request_body = FullInventorySubmissionSchema,
    responses(
        (status = 200, description = "Per-item report", body = FullInventoryReportSchema),
        (status = 400, description = "Body could not be parsed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "submitFullInventory"
)]
#[post("/inventory/full")]
pub async fn submit_full_inventory(
    state: web::Data<HttpState>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let submission = parse_full_submission(payload.into_inner())?;
    let report = state.inventory.submit_full(submission).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Reconcile one inventory record.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/{kind}",
    request_body = InventorySubmissionSchema,
    params(("kind" = String, Path, description = "Inventory kind, e.g. hardware")),
    responses(
        (status = 201, description = "Record created", body = ReconcileOutcomeSchema),
        (status = 200, description = "Record updated or unchanged", body = ReconcileOutcomeSchema),
        (status = 400, description = "Invalid record", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown kind", body = ErrorSchema),
        (status = 409, description = "Concurrent update; retry", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "submitInventory"
)]
#[post("/inventory/{kind}")]
pub async fn submit_inventory(
    state: web::Data<HttpState>,
    path: web::Path<KindPath>,
    payload: web::Json<Value>,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&path.kind)?;
    let (node_id, body) = split_envelope(payload.into_inner())?;
    let record = parse_record(kind, body)?;
    let outcome = state.inventory.submit(node_id, record).await?;
    Ok(HttpResponse::build(status_for(&outcome.classification)).json(outcome))
}

/// Current-state rows for one endpoint and kind.
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{kind}/{node_id}",
    params(
        ("kind" = String, Path, description = "Inventory kind"),
        ("node_id" = String, Path, description = "Endpoint identifier")
    ),
    responses(
        (status = 200, description = "Current state ordered by identity key",
            body = [CurrentStateRecordSchema]),
        (status = 400, description = "Invalid endpoint", body = ErrorSchema),
        (status = 404, description = "Unknown kind", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "getCurrentInventory"
)]
#[get("/inventory/{kind}/{node_id}")]
pub async fn get_current_state(
    state: web::Data<HttpState>,
    path: web::Path<EndpointPath>,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&path.kind)?;
    let node_id = parse_endpoint_id(&path.node_id, FieldName::new("node_id"))?;
    let rows = state.inventory_query.current_state(node_id, kind).await?;
    Ok(HttpResponse::Ok()
        .insert_header(READ_CACHE_CONTROL)
        .json(rows))
}

/// Change history for one endpoint and kind.
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{kind}/{node_id}/history",
    params(
        ("kind" = String, Path, description = "Inventory kind"),
        ("node_id" = String, Path, description = "Endpoint identifier"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Change events in detection order",
            body = [ChangeEventSchema]),
        (status = 400, description = "Invalid endpoint or identity key", body = ErrorSchema),
        (status = 404, description = "Unknown kind", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["inventory"],
    operation_id = "getInventoryHistory"
)]
#[get("/inventory/{kind}/{node_id}/history")]
pub async fn get_change_history(
    state: web::Data<HttpState>,
    path: web::Path<EndpointPath>,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let kind = parse_kind(&path.kind)?;
    let node_id = parse_endpoint_id(&path.node_id, FieldName::new("node_id"))?;
    let identity_key = parse_optional_identity_key(
        query.into_inner().identity_key,
        FieldName::new("identityKey"),
    )?;
    let events = state
        .inventory_query
        .change_history(node_id, kind, identity_key)
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(READ_CACHE_CONTROL)
        .json(events))
}

/// Register the inventory routes in matching order.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(submit_full_inventory)
        .service(submit_inventory)
        .service(get_change_history)
        .service(get_current_state);
}

#[cfg(test)]
#[path = "inventory_tests.rs"]
mod tests;
