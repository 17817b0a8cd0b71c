//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod error;
pub mod health;
pub mod inventory;
pub mod schemas;
pub mod state;
pub mod validation;

pub use error::ApiResult;

/// Largest accepted JSON body; full inventories of large hosts run to a few
/// hundred kilobytes.
pub const MAX_JSON_BODY_BYTES: usize = 4 * 1024 * 1024;

/// JSON extractor configuration rendering parse failures in the standard
/// error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(error::json_error_handler)
}
