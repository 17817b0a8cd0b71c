//! Reconciliation planning shared by every store adapter.
//!
//! Adapters own locking and persistence; this module owns the decision.
//! Given the candidate, the row currently stored for its key and the time
//! observed inside the lock scope, it yields exactly one of two writes:
//! refresh `last_seen`, or replace the current row and append one event.

use chrono::{DateTime, Utc};

use super::diff::{Classification, classify};
use super::outcome::{
    ChangeType, CurrentStateRecord, PendingChangeEvent, ReconcileCandidate, ReconcileOutcome,
};

/// Write an adapter must perform for one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationPlan {
    /// Payload unchanged: only `last_seen` moves.
    Touch {
        /// Current row with the refreshed `last_seen`.
        current: CurrentStateRecord,
    },
    /// New or changed payload: upsert the row and append one event.
    Commit {
        /// Created or updated classification.
        classification: Classification,
        /// Row to upsert.
        current: CurrentStateRecord,
        /// Event to append in the same transaction.
        event: PendingChangeEvent,
    },
}

impl ReconciliationPlan {
    /// Row the adapter must leave in current state.
    pub fn current(&self) -> &CurrentStateRecord {
        match self {
            Self::Touch { current } | Self::Commit { current, .. } => current,
        }
    }

    /// Classification that produced this plan.
    pub fn classification(&self) -> Classification {
        match self {
            Self::Touch { .. } => Classification::Unchanged,
            Self::Commit { classification, .. } => classification.clone(),
        }
    }

    /// Outcome reported once the plan has been persisted.
    pub fn into_outcome(self, event_sequence: Option<i64>) -> ReconcileOutcome {
        let classification = self.classification();
        let current = match self {
            Self::Touch { current } | Self::Commit { current, .. } => current,
        };
        ReconcileOutcome {
            node_id: current.node_id,
            kind: current.kind,
            identity_key: current.identity_key,
            classification,
            payload: current.payload,
            last_seen: current.last_seen,
            event_sequence,
        }
    }
}

/// Decide how to reconcile `candidate` against `existing`.
///
/// `detected_at` never moves backwards within a partition: when `now` lags
/// the previous change (clock skew between instances) the previous change
/// time is reused, and the store sequence breaks the tie. `last_seen` is
/// likewise never moved behind an earlier sighting.
pub fn plan_reconciliation(
    candidate: &ReconcileCandidate,
    existing: Option<&CurrentStateRecord>,
    now: DateTime<Utc>,
) -> ReconciliationPlan {
    let incoming = &candidate.record.payload;
    let classification = classify(incoming, existing.map(|row| &row.payload));

    match (classification, existing) {
        (Classification::Unchanged, Some(row)) => ReconciliationPlan::Touch {
            current: CurrentStateRecord {
                last_seen: now.max(row.last_seen),
                ..row.clone()
            },
        },
        (classification, existing) => {
            let detected_at = existing.map_or(now, |row| now.max(row.last_changed));
            let (change_type, changed_fields) = match &classification {
                Classification::Updated { changed_fields } => {
                    (ChangeType::Updated, changed_fields.clone())
                }
                _ => (ChangeType::Created, Vec::new()),
            };
            let current = CurrentStateRecord {
                node_id: candidate.node_id.clone(),
                kind: candidate.kind(),
                identity_key: candidate.identity_key().clone(),
                payload: incoming.clone(),
                payload_digest: incoming.digest(),
                first_seen: existing.map_or(now, |row| row.first_seen),
                last_changed: detected_at,
                last_seen: existing.map_or(detected_at, |row| detected_at.max(row.last_seen)),
            };
            let event = PendingChangeEvent {
                change_type,
                previous_payload: existing.map(|row| row.payload.clone()),
                new_payload: incoming.clone(),
                changed_fields,
                detected_at,
            };
            ReconciliationPlan::Commit {
                classification,
                current,
                event,
            }
        }
    }
}
