//! Field-level validation shared by the inventory record types.
//!
//! Every failure names the offending field so the HTTP adapter can report it
//! and the orchestrator can attach it to the failing item.

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

/// Inclusive severity range accepted for security findings.
pub const SEVERITY_RANGE: std::ops::RangeInclusive<i64> = 0..=10;

/// Maximum accepted length for identifiers (node ids and identity keys).
pub const MAX_IDENTIFIER_LEN: usize = 255;

/// Validation errors raised before any store mutation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryValidationError {
    /// A required field was blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// An identifier exceeded [`MAX_IDENTIFIER_LEN`].
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Maximum accepted length.
        max: usize,
    },
    /// An identifier contained control characters.
    #[error("{field} must not contain control characters")]
    ControlCharacters {
        /// Offending field.
        field: &'static str,
    },
    /// A numeric field fell outside its accepted range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Lower bound.
        min: i64,
        /// Upper bound.
        max: i64,
        /// Submitted value.
        value: i64,
    },
    /// A field did not parse in its expected format.
    #[error("{field} is not a valid {expected}: {value}")]
    InvalidFormat {
        /// Offending field.
        field: &'static str,
        /// Description of the accepted format.
        expected: &'static str,
        /// Submitted value.
        value: String,
    },
    /// A structured field was not a JSON object.
    #[error("{field} must be a JSON object")]
    NotAnObject {
        /// Offending field.
        field: &'static str,
    },
}

impl InventoryValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::ControlCharacters { field }
            | Self::OutOfRange { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::NotAnObject { field } => field,
        }
    }
}

/// Trim a required string, rejecting blanks.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, InventoryValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InventoryValidationError::Empty { field });
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional string; blanks collapse to `None`.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}

/// Validate an identifier: required, bounded, and free of control characters.
pub(crate) fn identifier(field: &'static str, value: &str) -> Result<String, InventoryValidationError> {
    let trimmed = required(field, value)?;
    if trimmed.chars().count() > MAX_IDENTIFIER_LEN {
        return Err(InventoryValidationError::TooLong {
            field,
            max: MAX_IDENTIFIER_LEN,
        });
    }
    if trimmed.chars().any(char::is_control) {
        return Err(InventoryValidationError::ControlCharacters { field });
    }
    Ok(trimmed)
}

pub(crate) fn severity(field: &'static str, value: i64) -> Result<i64, InventoryValidationError> {
    if SEVERITY_RANGE.contains(&value) {
        return Ok(value);
    }
    Err(InventoryValidationError::OutOfRange {
        field,
        min: *SEVERITY_RANGE.start(),
        max: *SEVERITY_RANGE.end(),
        value,
    })
}

/// Parse an IP literal and render it canonically (`::1`, not `0:0:0:0:0:0:0:1`).
pub(crate) fn ip_address(field: &'static str, value: &str) -> Result<String, InventoryValidationError> {
    let trimmed = required(field, value)?;
    trimmed
        .parse::<IpAddr>()
        .map(|addr| addr.to_string())
        .map_err(|_| InventoryValidationError::InvalidFormat {
            field,
            expected: "IPv4 or IPv6 address",
            value: trimmed,
        })
}

/// Parse a MAC literal (`aa:bb:..` or `AA-BB-..`) into lowercase colon form.
pub(crate) fn mac_address(field: &'static str, value: &str) -> Result<String, InventoryValidationError> {
    let trimmed = required(field, value)?;
    let invalid = || InventoryValidationError::InvalidFormat {
        field,
        expected: "MAC address",
        value: trimmed.clone(),
    };

    let separator = if trimmed.contains(':') { ':' } else { '-' };
    let octets: Vec<&str> = trimmed.split(separator).collect();
    let well_formed = octets.len() == 6
        && octets
            .iter()
            .all(|octet| octet.len() == 2 && octet.bytes().all(|b| b.is_ascii_hexdigit()));
    if !well_formed {
        return Err(invalid());
    }

    Ok(octets
        .iter()
        .map(|octet| octet.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(":"))
}

/// Accept `YYYY-MM-DD` or RFC 3339 timestamps.
pub(crate) fn applied_date(
    field: &'static str,
    value: Option<&str>,
) -> Result<Option<String>, InventoryValidationError> {
    let Some(trimmed) = optional(value) else {
        return Ok(None);
    };
    let parses = NaiveDate::parse_from_str(&trimmed, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(&trimmed).is_ok();
    if parses {
        Ok(Some(trimmed))
    } else {
        Err(InventoryValidationError::InvalidFormat {
            field,
            expected: "ISO date or RFC 3339 timestamp",
            value: trimmed,
        })
    }
}

pub(crate) fn object(field: &'static str, value: &Value) -> Result<Value, InventoryValidationError> {
    if value.is_object() {
        Ok(value.clone())
    } else {
        Err(InventoryValidationError::NotAnObject { field })
    }
}
