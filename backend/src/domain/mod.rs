//! Domain primitives, services and ports.
//!
//! Purpose: define the inventory entity model, the reconciliation engine and
//! the ports adapters implement. Nothing here depends on actix, Diesel or any
//! other transport or storage framework.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - TraceId — per-request correlation identifier.
//! - InventoryService — implementation of the inventory driving ports.
//! - ReconcilePolicy — retry and lock-wait bounds for store adapters.

pub mod error;
pub mod inventory;
mod inventory_service;
pub mod ports;
mod reconcile_policy;
pub mod trace_id;

pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::inventory_service::{InventoryService, map_decode_error, map_validation_error};
pub use self::reconcile_policy::ReconcilePolicy;
pub use self::trace_id::TraceId;

