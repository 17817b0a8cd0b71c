//! Endpoint and identity-key value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::{InventoryValidationError, identifier};

/// Stable identifier of a reporting machine (host UUID or hostname+domain).
///
/// Trimmed, non-empty, at most 255 characters, no control characters.
///
/// # Examples
/// ```
/// use inventory_backend::domain::inventory::EndpointId;
///
/// let node = EndpointId::new(" WS-0042.corp ").expect("valid endpoint");
/// assert_eq!(node.as_ref(), "WS-0042.corp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointId(String);

impl EndpointId {
    /// Validate and construct an endpoint identifier.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InventoryValidationError> {
        identifier("node_id", value.as_ref()).map(Self)
    }
}

impl AsRef<str> for EndpointId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EndpointId> for String {
    fn from(value: EndpointId) -> Self {
        value.0
    }
}

impl TryFrom<String> for EndpointId {
    type Error = InventoryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Kind-specific natural key, unique within one endpoint and kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Validate and construct an identity key from the record's `id` field.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InventoryValidationError> {
        identifier("id", value.as_ref()).map(Self)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<IdentityKey> for String {
    fn from(value: IdentityKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdentityKey {
    type Error = InventoryValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoint_ids_report_the_node_id_field() {
        let err = EndpointId::new("").expect_err("blank endpoint");
        assert_eq!(err.field(), "node_id");
    }

    #[rstest]
    fn deserialising_validates_identity_keys() {
        let key: IdentityKey = serde_json::from_str("\" KB1 \"").expect("valid key");
        assert_eq!(key.as_ref(), "KB1");
        assert!(serde_json::from_str::<IdentityKey>("\"  \"").is_err());
    }
}
