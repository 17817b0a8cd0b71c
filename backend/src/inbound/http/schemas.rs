//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the structure of their corresponding domain
//! types but live in the inbound adapter layer where framework concerns belong.

use serde_json::Value;
use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The API key is missing or wrong.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Contention prevented the write; resubmit unchanged.
    #[schema(rename = "conflict")]
    Conflict,
    /// The inventory store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "mac_address is not a valid MAC address: zz")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the offending `field`.
    details: Option<Value>,
}

/// OpenAPI schema for [`crate::domain::inventory::InventoryKind`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::InventoryKind)]
pub enum InventoryKindSchema {
    #[schema(rename = "system")]
    System,
    #[schema(rename = "hardware")]
    Hardware,
    #[schema(rename = "software")]
    Software,
    #[schema(rename = "hotfix")]
    Hotfix,
    #[schema(rename = "security")]
    Security,
    #[schema(rename = "network")]
    Network,
    #[schema(rename = "browser")]
    Browser,
}

/// OpenAPI schema for [`crate::domain::inventory::ChangeType`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::ChangeType)]
pub enum ChangeTypeSchema {
    #[schema(rename = "created")]
    Created,
    #[schema(rename = "updated")]
    Updated,
    #[schema(rename = "removed_implicit")]
    RemovedImplicit,
}

/// Classification label flattened into reconcile outcomes.
#[derive(ToSchema)]
pub enum ChangeClassificationSchema {
    #[schema(rename = "created")]
    Created,
    #[schema(rename = "unchanged")]
    Unchanged,
    #[schema(rename = "updated")]
    Updated,
}

/// OpenAPI schema for [`crate::domain::inventory::ReconcileOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::ReconcileOutcome)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ReconcileOutcomeSchema {
    #[schema(example = "WS-0042.corp")]
    node_id: String,
    kind: InventoryKindSchema,
    #[schema(example = "disk-0")]
    identity_key: String,
    /// Whether the record was created, unchanged or updated.
    change: ChangeClassificationSchema,
    /// Dotted paths that differ; present only for `updated`.
    changed_fields: Option<Vec<String>>,
    /// Canonical payload now held as current state.
    payload: Value,
    last_seen: String,
    /// Sequence of the appended change event, when one was written.
    event_sequence: Option<i64>,
}

/// OpenAPI schema for [`crate::domain::inventory::CurrentStateRecord`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::CurrentStateRecord)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CurrentStateRecordSchema {
    node_id: String,
    kind: InventoryKindSchema,
    identity_key: String,
    payload: Value,
    /// Hex SHA-256 of the canonical payload.
    payload_digest: String,
    first_seen: String,
    last_changed: String,
    last_seen: String,
}

/// OpenAPI schema for [`crate::domain::inventory::ChangeEvent`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::ChangeEvent)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ChangeEventSchema {
    /// Strictly increasing per store.
    sequence: i64,
    node_id: String,
    kind: InventoryKindSchema,
    identity_key: String,
    change_type: ChangeTypeSchema,
    previous_payload: Option<Value>,
    new_payload: Value,
    changed_fields: Vec<String>,
    detected_at: String,
}

/// Per-item status inside a full-inventory report.
#[derive(ToSchema)]
pub enum ItemStatusSchema {
    #[schema(rename = "committed")]
    Committed,
    #[schema(rename = "failed")]
    Failed,
}

/// OpenAPI schema for [`crate::domain::inventory::ItemReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::ItemReport)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ItemReportSchema {
    kind: InventoryKindSchema,
    identity_key: String,
    status: ItemStatusSchema,
    /// Present when `status` is `committed`.
    outcome: Option<ReconcileOutcomeSchema>,
    /// Present when `status` is `failed`.
    error: Option<ErrorSchema>,
}

/// OpenAPI schema for [`crate::domain::inventory::FullInventoryReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::FullInventoryReport)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FullInventoryReportSchema {
    node_id: String,
    /// `true` only when every item committed.
    success: bool,
    items: Vec<ItemReportSchema>,
}

/// Request body for `POST /api/v1/inventory/{kind}`.
///
/// `nodeId` sits alongside the kind-specific record fields.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct InventorySubmissionSchema {
    #[schema(example = "WS-0042.corp")]
    node_id: String,
    /// Kind-specific natural key. The remaining kind-specific fields sit
    /// alongside it.
    #[schema(example = "disk-0")]
    id: String,
}

/// Request body for `POST /api/v1/inventory/full`.
#[derive(ToSchema)]
#[schema(as = crate::domain::inventory::FullInventorySubmission)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FullInventorySubmissionSchema {
    node_id: String,
    system: Value,
    hardware: Option<Vec<Value>>,
    software: Option<Vec<Value>>,
    hotfixes: Option<Vec<Value>>,
    security: Option<Vec<Value>>,
    network: Option<Vec<Value>>,
    browser: Option<Vec<Value>>,
}
