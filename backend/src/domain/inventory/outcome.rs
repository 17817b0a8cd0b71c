//! Current-state rows, change events and reconcile outcomes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::Classification;
use super::identity::{EndpointId, IdentityKey};
use super::kind::InventoryKind;
use super::payload::ComparablePayload;
use super::records::{InventoryRecord, NormalizedRecord};
use super::validation::InventoryValidationError;

/// Transition recorded by a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// First sighting of the identity key.
    Created,
    /// Payload differs from the previous current state.
    Updated,
    /// Reserved for an explicit removal operation; reconciliation never
    /// emits it.
    RemovedImplicit,
}

impl ChangeType {
    /// Database representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::RemovedImplicit => "removed_implicit",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored change type is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown change type: {0}")]
pub struct ParseChangeTypeError(pub String);

impl FromStr for ChangeType {
    type Err = ParseChangeTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "removed_implicit" => Ok(Self::RemovedImplicit),
            other => Err(ParseChangeTypeError(other.to_owned())),
        }
    }
}

/// Validated input to the reconciliation store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileCandidate {
    /// Reporting endpoint.
    pub node_id: EndpointId,
    /// Identity and comparable payload of the record.
    pub record: NormalizedRecord,
}

impl ReconcileCandidate {
    /// Validate `record` and bind it to `node_id`.
    ///
    /// Fails before any store access when the record is malformed.
    pub fn new(
        node_id: EndpointId,
        record: &InventoryRecord,
    ) -> Result<Self, InventoryValidationError> {
        Ok(Self {
            node_id,
            record: record.normalize()?,
        })
    }

    /// Kind of the wrapped record.
    pub fn kind(&self) -> InventoryKind {
        self.record.kind
    }

    /// Identity key of the wrapped record.
    pub fn identity_key(&self) -> &IdentityKey {
        &self.record.identity_key
    }
}

/// Latest known state of one entity on one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentStateRecord {
    pub node_id: EndpointId,
    pub kind: InventoryKind,
    pub identity_key: IdentityKey,
    pub payload: ComparablePayload,
    /// SHA-256 of the canonical payload.
    pub payload_digest: String,
    pub first_seen: DateTime<Utc>,
    /// Detection time of the latest change event.
    pub last_changed: DateTime<Utc>,
    /// Freshness timestamp, refreshed on every reconcile.
    pub last_seen: DateTime<Utc>,
}

/// Change event that has been planned but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChangeEvent {
    pub change_type: ChangeType,
    pub previous_payload: Option<ComparablePayload>,
    pub new_payload: ComparablePayload,
    pub changed_fields: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

impl PendingChangeEvent {
    /// Attach the store-assigned sequence number.
    pub fn into_event(
        self,
        sequence: i64,
        node_id: EndpointId,
        kind: InventoryKind,
        identity_key: IdentityKey,
    ) -> ChangeEvent {
        ChangeEvent {
            sequence,
            node_id,
            kind,
            identity_key,
            change_type: self.change_type,
            previous_payload: self.previous_payload,
            new_payload: self.new_payload,
            changed_fields: self.changed_fields,
            detected_at: self.detected_at,
        }
    }
}

/// Immutable record of a detected transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Store-assigned, strictly increasing sequence number.
    pub sequence: i64,
    pub node_id: EndpointId,
    pub kind: InventoryKind,
    pub identity_key: IdentityKey,
    pub change_type: ChangeType,
    pub previous_payload: Option<ComparablePayload>,
    pub new_payload: ComparablePayload,
    pub changed_fields: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

/// What a single reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub node_id: EndpointId,
    pub kind: InventoryKind,
    pub identity_key: IdentityKey,
    #[serde(flatten)]
    pub classification: Classification,
    /// Current payload after reconciliation.
    pub payload: ComparablePayload,
    pub last_seen: DateTime<Utc>,
    /// Sequence of the appended change event, if one was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_sequence: Option<i64>,
}
