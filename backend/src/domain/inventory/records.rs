//! Typed inventory records, one struct per kind.
//!
//! Each record knows how to validate itself, extract its identity key and
//! produce the [`ComparablePayload`] the diff engine compares. The per-kind
//! work is confined to [`InventoryEntity::validated_payload`]; everything
//! after that is shared.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::identity::IdentityKey;
use super::kind::InventoryKind;
use super::payload::ComparablePayload;
use super::validation::{
    InventoryValidationError, applied_date, ip_address, mac_address, object, optional, required,
    severity,
};

/// Identity and comparable form of a validated record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// Kind of the record.
    pub kind: InventoryKind,
    /// Natural key within the endpoint and kind.
    pub identity_key: IdentityKey,
    /// Canonical payload compared against current state.
    pub payload: ComparablePayload,
}

/// Per-kind identity extraction and normalisation.
pub trait InventoryEntity {
    /// Kind implemented by this record type.
    const KIND: InventoryKind;

    /// Top-level payload fields excluded from change detection.
    const VOLATILE_FIELDS: &'static [&'static str] = &[];

    /// The `id` exactly as submitted, available before validation.
    fn raw_id(&self) -> &str;

    /// Natural key of the record.
    fn identity_key(&self) -> Result<IdentityKey, InventoryValidationError> {
        IdentityKey::new(self.raw_id())
    }

    /// Validate every field and render the normalised JSON payload.
    fn validated_payload(&self) -> Result<Value, InventoryValidationError>;

    /// Validate, then compute identity key and comparable payload.
    fn normalize(&self) -> Result<NormalizedRecord, InventoryValidationError> {
        let identity_key = self.identity_key()?;
        let mut payload = self.validated_payload()?;
        if let Value::Object(map) = &mut payload {
            map.insert("id".to_owned(), Value::String(identity_key.to_string()));
        }
        Ok(NormalizedRecord {
            kind: Self::KIND,
            identity_key,
            payload: ComparablePayload::new(payload, Self::VOLATILE_FIELDS),
        })
    }
}

/// Physical component such as a disk or CPU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    pub specifications: Value,
}

impl InventoryEntity for HardwareRecord {
    const KIND: InventoryKind = InventoryKind::Hardware;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "name": required("name", &self.name)?,
            "type": required("type", &self.component_type)?,
            "manufacturer": optional(self.manufacturer.as_deref()),
            "specifications": object("specifications", &self.specifications)?,
        }))
    }
}

/// Installed software package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub license_key: Option<String>,
}

impl InventoryEntity for SoftwareRecord {
    const KIND: InventoryKind = InventoryKind::Software;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "name": required("name", &self.name)?,
            "version": required("version", &self.version)?,
            "license_key": optional(self.license_key.as_deref()),
        }))
    }
}

/// Applied operating-system hotfix (`KB...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotfixRecord {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub applied_date: Option<String>,
}

impl InventoryEntity for HotfixRecord {
    const KIND: InventoryKind = InventoryKind::Hotfix;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn identity_key(&self) -> Result<IdentityKey, InventoryValidationError> {
        IdentityKey::new(self.id.trim().to_uppercase())
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "description": required("description", &self.description)?,
            "applied_date": applied_date("applied_date", self.applied_date.as_deref())?,
        }))
    }
}

/// The singular system description of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub id: String,
    pub hostname: String,
    pub operating_system: String,
    pub state: String,
}

impl InventoryEntity for SystemRecord {
    const KIND: InventoryKind = InventoryKind::System;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "hostname": required("hostname", &self.hostname)?,
            "operating_system": required("operating_system", &self.operating_system)?,
            "state": required("state", &self.state)?,
        }))
    }
}

/// Security finding with a bounded severity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRecord {
    pub id: String,
    pub vulnerability: String,
    pub severity: i64,
    pub status: String,
}

impl InventoryEntity for SecurityRecord {
    const KIND: InventoryKind = InventoryKind::Security;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "vulnerability": required("vulnerability", &self.vulnerability)?,
            "severity": severity("severity", self.severity)?,
            "status": required("status", &self.status)?,
        }))
    }
}

/// Network interface with its addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRecord {
    pub id: String,
    pub interface: String,
    pub ip_address: String,
    pub mac_address: String,
}

impl InventoryEntity for NetworkRecord {
    const KIND: InventoryKind = InventoryKind::Network;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "interface": required("interface", &self.interface)?,
            "ip_address": ip_address("ip_address", &self.ip_address)?,
            "mac_address": mac_address("mac_address", &self.mac_address)?,
        }))
    }
}

/// Browser installation and its settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserRecord {
    pub id: String,
    pub name: String,
    pub version: String,
    pub settings: Value,
}

impl InventoryEntity for BrowserRecord {
    const KIND: InventoryKind = InventoryKind::Browser;

    fn raw_id(&self) -> &str {
        &self.id
    }

    fn validated_payload(&self) -> Result<Value, InventoryValidationError> {
        Ok(json!({
            "name": required("name", &self.name)?,
            "version": required("version", &self.version)?,
            "settings": object("settings", &self.settings)?,
        }))
    }
}

/// A record of any kind.
///
/// Lets the reconcile path stay generic while each kind keeps its typed
/// schema.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryRecord {
    System(SystemRecord),
    Hardware(HardwareRecord),
    Software(SoftwareRecord),
    Hotfix(HotfixRecord),
    Security(SecurityRecord),
    Network(NetworkRecord),
    Browser(BrowserRecord),
}

macro_rules! dispatch {
    ($record:expr, $bound:ident => $body:expr) => {
        match $record {
            InventoryRecord::System($bound) => $body,
            InventoryRecord::Hardware($bound) => $body,
            InventoryRecord::Software($bound) => $body,
            InventoryRecord::Hotfix($bound) => $body,
            InventoryRecord::Security($bound) => $body,
            InventoryRecord::Network($bound) => $body,
            InventoryRecord::Browser($bound) => $body,
        }
    };
}

impl InventoryRecord {
    /// Decode a record body for the given kind.
    ///
    /// # Examples
    /// ```
    /// use inventory_backend::domain::inventory::{InventoryKind, InventoryRecord};
    /// use serde_json::json;
    ///
    /// let record = InventoryRecord::from_json(
    ///     InventoryKind::Software,
    ///     json!({"id": "S1", "name": "7-Zip", "version": "23.01"}),
    /// )
    /// .expect("valid software record");
    /// assert_eq!(record.kind(), InventoryKind::Software);
    /// ```
    pub fn from_json(kind: InventoryKind, body: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            InventoryKind::System => Self::System(serde_json::from_value(body)?),
            InventoryKind::Hardware => Self::Hardware(serde_json::from_value(body)?),
            InventoryKind::Software => Self::Software(serde_json::from_value(body)?),
            InventoryKind::Hotfix => Self::Hotfix(serde_json::from_value(body)?),
            InventoryKind::Security => Self::Security(serde_json::from_value(body)?),
            InventoryKind::Network => Self::Network(serde_json::from_value(body)?),
            InventoryKind::Browser => Self::Browser(serde_json::from_value(body)?),
        })
    }

    /// Kind of the wrapped record.
    pub fn kind(&self) -> InventoryKind {
        match self {
            Self::System(_) => InventoryKind::System,
            Self::Hardware(_) => InventoryKind::Hardware,
            Self::Software(_) => InventoryKind::Software,
            Self::Hotfix(_) => InventoryKind::Hotfix,
            Self::Security(_) => InventoryKind::Security,
            Self::Network(_) => InventoryKind::Network,
            Self::Browser(_) => InventoryKind::Browser,
        }
    }

    /// The `id` exactly as submitted.
    pub fn raw_id(&self) -> &str {
        dispatch!(self, record => record.raw_id())
    }

    /// Natural key of the wrapped record.
    pub fn identity_key(&self) -> Result<IdentityKey, InventoryValidationError> {
        dispatch!(self, record => record.identity_key())
    }

    /// Validate and normalise the wrapped record.
    pub fn normalize(&self) -> Result<NormalizedRecord, InventoryValidationError> {
        dispatch!(self, record => record.normalize())
    }
}
