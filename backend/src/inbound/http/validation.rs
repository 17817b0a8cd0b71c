//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use serde_json::json;

use crate::domain::Error;
use crate::domain::inventory::{EndpointId, IdentityKey, InventoryKind, InventoryValidationError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_field_error(field: FieldName, err: &InventoryValidationError) -> Error {
    ValidationError::new(field.as_str(), err.to_string()).with_code(ErrorCode::InvalidField)
}

/// Path segments naming no inventory kind address no resource.
pub(crate) fn parse_kind(value: &str) -> Result<InventoryKind, Error> {
    InventoryKind::from_str(value)
        .map_err(|err| Error::not_found(err.to_string()).with_details(json!({ "kind": value })))
}

pub(crate) fn parse_endpoint_id(value: &str, field: FieldName) -> Result<EndpointId, Error> {
    EndpointId::new(value).map_err(|err| invalid_field_error(field, &err))
}

pub(crate) fn parse_optional_identity_key(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<IdentityKey>, Error> {
    value
        .map(|raw| IdentityKey::new(raw).map_err(|err| invalid_field_error(field, &err)))
        .transpose()
}
