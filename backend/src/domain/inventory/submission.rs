//! Full-inventory submission aggregate and its per-item report.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::identity::EndpointId;
use super::kind::InventoryKind;
use super::outcome::ReconcileOutcome;
use super::records::{InventoryRecord, SystemRecord};
use crate::domain::Error;

/// One endpoint's complete inventory: exactly one system record and
/// zero-or-more records of every other kind.
///
/// Only the system record is decoded with the envelope. Every other item
/// stays raw JSON until [`FullInventorySubmission::into_items`], so one
/// malformed item fails alone instead of rejecting the whole bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullInventorySubmission {
    #[serde(rename = "nodeId", alias = "node_id")]
    pub node_id: EndpointId,
    pub system: SystemRecord,
    #[serde(default)]
    pub hardware: Vec<Value>,
    #[serde(default)]
    pub software: Vec<Value>,
    #[serde(default, alias = "hotfix")]
    pub hotfixes: Vec<Value>,
    #[serde(default)]
    pub security: Vec<Value>,
    #[serde(default)]
    pub network: Vec<Value>,
    #[serde(default)]
    pub browser: Vec<Value>,
}

/// A submitted item whose body does not decode as its kind's record.
#[derive(Debug)]
pub struct UndecodedItem {
    pub kind: InventoryKind,
    /// The body's `id` when it is a string, otherwise empty.
    pub raw_id: String,
    pub error: serde_json::Error,
}

impl FullInventorySubmission {
    /// Decode every item in processing order: kinds in
    /// [`InventoryKind::ALL`] order, submission order within a kind.
    pub fn into_items(self) -> Vec<Result<InventoryRecord, UndecodedItem>> {
        let mut items = Vec::with_capacity(1 + self.len_excluding_system());
        items.push(Ok(InventoryRecord::System(self.system)));
        let lists = [
            (InventoryKind::Hardware, self.hardware),
            (InventoryKind::Software, self.software),
            (InventoryKind::Hotfix, self.hotfixes),
            (InventoryKind::Security, self.security),
            (InventoryKind::Network, self.network),
            (InventoryKind::Browser, self.browser),
        ];
        for (kind, bodies) in lists {
            items.extend(bodies.into_iter().map(|body| decode_item(kind, body)));
        }
        items
    }

    fn len_excluding_system(&self) -> usize {
        self.hardware.len()
            + self.software.len()
            + self.hotfixes.len()
            + self.security.len()
            + self.network.len()
            + self.browser.len()
    }
}

fn decode_item(kind: InventoryKind, body: Value) -> Result<InventoryRecord, UndecodedItem> {
    let raw_id = body
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    InventoryRecord::from_json(kind, body).map_err(|error| UndecodedItem {
        kind,
        raw_id,
        error,
    })
}

/// Outcome of one record within a full submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    /// The record was reconciled and its write committed.
    Committed {
        /// Reconcile outcome.
        outcome: ReconcileOutcome,
    },
    /// The record was rejected or its write failed.
    Failed {
        /// Error describing the failure.
        error: Error,
    },
}

/// Report entry for one `(kind, identity key)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReport {
    pub kind: InventoryKind,
    /// Normalised key, or the raw submitted id when extraction failed.
    pub identity_key: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

impl ItemReport {
    /// `true` when the item committed.
    pub const fn is_committed(&self) -> bool {
        matches!(self.status, ItemStatus::Committed { .. })
    }
}

/// Aggregated result of a full-inventory submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullInventoryReport {
    pub node_id: EndpointId,
    /// `true` only when every item committed.
    pub success: bool,
    pub items: Vec<ItemReport>,
}

impl FullInventoryReport {
    /// Build a report, deriving `success` from the items.
    pub fn new(node_id: EndpointId, items: Vec<ItemReport>) -> Self {
        let success = items.iter().all(ItemReport::is_committed);
        Self {
            node_id,
            success,
            items,
        }
    }

    /// Items that failed.
    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|item| !item.is_committed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn decodes_with_optional_lists_and_flattens_in_kind_order() {
        let submission: FullInventorySubmission = serde_json::from_value(json!({
            "nodeId": "node-1",
            "system": {"id": "SYS", "hostname": "ws-1", "operating_system": "Windows 11", "state": "running"},
            "network": [{"id": "eth0", "interface": "Ethernet", "ip_address": "10.0.0.2", "mac_address": "aa:bb:cc:dd:ee:ff"}],
            "hardware": [{"id": "H1", "name": "DiskA", "type": "ssd", "specifications": {}}],
            "hotfixes": [{"id": "KB1", "description": "fix"}]
        }))
        .expect("valid submission");

        let kinds: Vec<_> = submission
            .into_items()
            .into_iter()
            .map(|item| item.expect("decodes").kind())
            .collect();
        assert_eq!(
            kinds,
            vec![
                InventoryKind::System,
                InventoryKind::Hardware,
                InventoryKind::Hotfix,
                InventoryKind::Network
            ]
        );
    }

    #[rstest]
    fn malformed_items_stay_in_place_without_failing_siblings() {
        let submission: FullInventorySubmission = serde_json::from_value(json!({
            "nodeId": "node-1",
            "system": {"id": "SYS", "hostname": "ws-1", "operating_system": "Windows 11", "state": "running"},
            "hardware": [{"id": "H1", "type": "ssd", "specifications": {}}],
            "software": [{"id": "S1", "name": "Editor", "version": "1.0"}]
        }))
        .expect("envelope decodes even with a malformed item");

        let items = submission.into_items();
        assert_eq!(items.len(), 3);
        let undecoded = items[1].as_ref().expect_err("hardware lacks a name");
        assert_eq!(undecoded.kind, InventoryKind::Hardware);
        assert_eq!(undecoded.raw_id, "H1");
        assert!(undecoded.error.to_string().contains("missing field `name`"));
        assert_eq!(
            items[2].as_ref().map(InventoryRecord::kind).ok(),
            Some(InventoryKind::Software)
        );
    }

    #[rstest]
    fn system_is_mandatory() {
        let result = serde_json::from_value::<FullInventorySubmission>(json!({
            "nodeId": "node-1",
            "hardware": []
        }));
        let err = result.expect_err("system missing");
        assert!(err.to_string().contains("system"));
    }

    #[rstest]
    fn report_success_requires_every_item() {
        let node = EndpointId::new("node-1").expect("node");
        let failed = ItemReport {
            kind: InventoryKind::Network,
            identity_key: "eth0".into(),
            status: ItemStatus::Failed {
                error: Error::invalid_request("mac_address is not a valid MAC address"),
            },
        };
        let report = FullInventoryReport::new(node.clone(), vec![failed]);
        assert!(!report.success);
        assert_eq!(report.failures().count(), 1);

        let value = serde_json::to_value(&report).expect("serialise report");
        assert_eq!(value["items"][0]["status"], json!("failed"));
        assert_eq!(value["items"][0]["identityKey"], json!("eth0"));
        assert_eq!(value["items"][0]["error"]["code"], json!("invalid_request"));

        assert!(FullInventoryReport::new(node, Vec::new()).success);
    }
}
