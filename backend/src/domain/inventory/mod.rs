//! Inventory entity model, fingerprint/diff engine and reconciliation plan.
//!
//! - [`records`] holds the typed per-kind schemas and their normalisation.
//! - [`diff`] classifies an incoming payload against current state.
//! - [`plan`] turns a classification into the write a store must perform.
//! - [`submission`] models the full-inventory bundle and its report.

pub mod diff;
pub mod identity;
pub mod kind;
pub mod outcome;
pub mod payload;
pub mod plan;
pub mod records;
pub mod submission;
pub mod validation;

pub use self::diff::{Classification, classify};
pub use self::identity::{EndpointId, IdentityKey};
pub use self::kind::{InventoryKind, ParseInventoryKindError};
pub use self::outcome::{
    ChangeEvent, ChangeType, CurrentStateRecord, ParseChangeTypeError, PendingChangeEvent,
    ReconcileCandidate, ReconcileOutcome,
};
pub use self::payload::ComparablePayload;
pub use self::plan::{ReconciliationPlan, plan_reconciliation};
pub use self::records::{
    BrowserRecord, HardwareRecord, HotfixRecord, InventoryEntity, InventoryRecord, NetworkRecord,
    NormalizedRecord, SecurityRecord, SoftwareRecord, SystemRecord,
};
pub use self::submission::{
    FullInventoryReport, FullInventorySubmission, ItemReport, ItemStatus, UndecodedItem,
};
pub use self::validation::InventoryValidationError;
