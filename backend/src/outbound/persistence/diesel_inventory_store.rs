//! PostgreSQL-backed inventory store.
//!
//! Each kind owns a `<kind>_current` table keyed by `(node_id, identity_key)`
//! and an append-only `<kind>_changes` table whose `BIGSERIAL` id gives a
//! total order. One reconcile attempt is one transaction:
//!
//! 1. `SET LOCAL lock_timeout` bounds every lock wait in the transaction.
//! 2. `pg_advisory_xact_lock` on the `(kind, node_id, identity_key)` hash
//!    serialises writers across service instances, including the first
//!    insert where no row exists yet to lock.
//! 3. The current row is read, the shared plan decides, and the plan is
//!    written. Commit or rollback releases the advisory lock.
//!
//! Contention is retried in a fresh transaction up to the policy's attempt
//! budget, then surfaces as a conflict.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Jsonb, Nullable, Text, Timestamptz};
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::warn;

use crate::domain::ReconcilePolicy;
use crate::domain::inventory::{
    ChangeEvent, ChangeType, ComparablePayload, CurrentStateRecord, EndpointId, IdentityKey,
    InventoryKind, ReconcileCandidate, ReconcileOutcome, ReconciliationPlan, plan_reconciliation,
};
use crate::domain::ports::{InventoryStore, InventoryStoreError};

use super::diesel_helpers::{
    is_retryable_conflict, map_basic_diesel_error, map_pool_error_message,
};
use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the inventory store port.
#[derive(Clone)]
pub struct DieselInventoryStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
    policy: ReconcilePolicy,
}

impl DieselInventoryStore {
    /// Create a store over the given pool.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>, policy: ReconcilePolicy) -> Self {
        Self {
            pool,
            clock,
            policy,
        }
    }
}

#[derive(Debug, QueryableByName)]
struct CurrentRow {
    #[diesel(sql_type = Text)]
    node_id: String,
    #[diesel(sql_type = Text)]
    identity_key: String,
    #[diesel(sql_type = Jsonb)]
    payload: serde_json::Value,
    #[diesel(sql_type = Text)]
    payload_digest: String,
    #[diesel(sql_type = Timestamptz)]
    first_seen: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    last_changed: DateTime<Utc>,
    #[diesel(sql_type = Timestamptz)]
    last_seen: DateTime<Utc>,
}

#[derive(Debug, QueryableByName)]
struct ChangeRow {
    #[diesel(sql_type = BigInt)]
    id: i64,
    #[diesel(sql_type = Text)]
    node_id: String,
    #[diesel(sql_type = Text)]
    identity_key: String,
    #[diesel(sql_type = Text)]
    change_type: String,
    #[diesel(sql_type = Nullable<Jsonb>)]
    previous_payload: Option<serde_json::Value>,
    #[diesel(sql_type = Jsonb)]
    new_payload: serde_json::Value,
    #[diesel(sql_type = Array<Text>)]
    changed_fields: Vec<String>,
    #[diesel(sql_type = Timestamptz)]
    detected_at: DateTime<Utc>,
}

#[derive(Debug, QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

impl CurrentRow {
    fn into_record(self, kind: InventoryKind) -> Result<CurrentStateRecord, InventoryStoreError> {
        Ok(CurrentStateRecord {
            node_id: EndpointId::new(&self.node_id).map_err(corrupt_row)?,
            kind,
            identity_key: IdentityKey::new(&self.identity_key).map_err(corrupt_row)?,
            payload: ComparablePayload::from(self.payload),
            payload_digest: self.payload_digest,
            first_seen: self.first_seen,
            last_changed: self.last_changed,
            last_seen: self.last_seen,
        })
    }
}

impl ChangeRow {
    fn into_event(self, kind: InventoryKind) -> Result<ChangeEvent, InventoryStoreError> {
        Ok(ChangeEvent {
            sequence: self.id,
            node_id: EndpointId::new(&self.node_id).map_err(corrupt_row)?,
            kind,
            identity_key: IdentityKey::new(&self.identity_key).map_err(corrupt_row)?,
            change_type: self
                .change_type
                .parse::<ChangeType>()
                .map_err(corrupt_row)?,
            previous_payload: self.previous_payload.map(ComparablePayload::from),
            new_payload: ComparablePayload::from(self.new_payload),
            changed_fields: self.changed_fields,
            detected_at: self.detected_at,
        })
    }
}

/// Failure of a single reconcile attempt.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error(transparent)]
    Store(#[from] InventoryStoreError),
}

fn corrupt_row(error: impl std::fmt::Display) -> InventoryStoreError {
    InventoryStoreError::query(format!("stored inventory row is invalid: {error}"))
}

fn map_pool_error(error: PoolError) -> InventoryStoreError {
    InventoryStoreError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> InventoryStoreError {
    map_basic_diesel_error(
        error,
        InventoryStoreError::query,
        InventoryStoreError::connection,
    )
}

fn map_attempt_error(error: AttemptError) -> InventoryStoreError {
    match error {
        AttemptError::Pool(err) => map_pool_error(err),
        AttemptError::Diesel(err) => map_diesel_error(err),
        AttemptError::Store(err) => err,
    }
}

/// Advisory-lock key text; the unit separator cannot appear in identifiers.
fn partition_lock_key(candidate: &ReconcileCandidate) -> String {
    format!(
        "{}\u{1f}{}\u{1f}{}",
        candidate.kind(),
        candidate.node_id,
        candidate.identity_key()
    )
}

fn select_current_sql(kind: InventoryKind) -> String {
    format!(
        "SELECT node_id, identity_key, payload, payload_digest, first_seen, last_changed, last_seen \
         FROM {table} WHERE node_id = $1 AND identity_key = $2",
        table = kind.current_table()
    )
}

fn touch_sql(kind: InventoryKind) -> String {
    format!(
        "UPDATE {table} SET last_seen = $3 WHERE node_id = $1 AND identity_key = $2",
        table = kind.current_table()
    )
}

fn upsert_current_sql(kind: InventoryKind) -> String {
    format!(
        "INSERT INTO {table} \
             (node_id, identity_key, payload, payload_digest, first_seen, last_changed, last_seen) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (node_id, identity_key) DO UPDATE SET \
             payload = EXCLUDED.payload, \
             payload_digest = EXCLUDED.payload_digest, \
             last_changed = EXCLUDED.last_changed, \
             last_seen = EXCLUDED.last_seen",
        table = kind.current_table()
    )
}

fn insert_change_sql(kind: InventoryKind) -> String {
    format!(
        "INSERT INTO {table} \
             (node_id, identity_key, change_type, previous_payload, new_payload, changed_fields, detected_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
        table = kind.changes_table()
    )
}

impl DieselInventoryStore {
    async fn reconcile_once(
        &self,
        candidate: &ReconcileCandidate,
    ) -> Result<ReconcileOutcome, AttemptError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let kind = candidate.kind();
        let node_id = candidate.node_id.as_ref();
        let identity_key = candidate.identity_key().as_ref();
        let lock_key = partition_lock_key(candidate);
        // Integer milliseconds only; SET does not accept bind parameters.
        let lock_timeout = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.policy.lock_timeout().as_millis()
        );
        let clock = Arc::clone(&self.clock);

        let mut conn = self.pool.get().await?;
        conn.transaction::<_, AttemptError, _>(|conn| {
            async move {
                sql_query(lock_timeout).execute(conn).await?;
                sql_query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                    .bind::<Text, _>(&lock_key)
                    .execute(conn)
                    .await?;

                let existing = sql_query(select_current_sql(kind))
                    .bind::<Text, _>(node_id)
                    .bind::<Text, _>(identity_key)
                    .get_result::<CurrentRow>(conn)
                    .await
                    .optional()?
                    .map(|row| row.into_record(kind))
                    .transpose()?;

                let plan = plan_reconciliation(candidate, existing.as_ref(), clock.utc());
                let sequence = match &plan {
                    ReconciliationPlan::Touch { current } => {
                        sql_query(touch_sql(kind))
                            .bind::<Text, _>(node_id)
                            .bind::<Text, _>(identity_key)
                            .bind::<Timestamptz, _>(current.last_seen)
                            .execute(conn)
                            .await?;
                        None
                    }
                    ReconciliationPlan::Commit { current, event, .. } => {
                        sql_query(upsert_current_sql(kind))
                            .bind::<Text, _>(node_id)
                            .bind::<Text, _>(identity_key)
                            .bind::<Jsonb, _>(current.payload.as_value())
                            .bind::<Text, _>(&current.payload_digest)
                            .bind::<Timestamptz, _>(current.first_seen)
                            .bind::<Timestamptz, _>(current.last_changed)
                            .bind::<Timestamptz, _>(current.last_seen)
                            .execute(conn)
                            .await?;
                        let inserted = sql_query(insert_change_sql(kind))
                            .bind::<Text, _>(node_id)
                            .bind::<Text, _>(identity_key)
                            .bind::<Text, _>(event.change_type.as_str())
                            .bind::<Nullable<Jsonb>, _>(
                                event.previous_payload.as_ref().map(ComparablePayload::as_value),
                            )
                            .bind::<Jsonb, _>(event.new_payload.as_value())
                            .bind::<Array<Text>, _>(&event.changed_fields)
                            .bind::<Timestamptz, _>(event.detected_at)
                            .get_result::<InsertedId>(conn)
                            .await?;
                        Some(inserted.id)
                    }
                };
                Ok(plan.into_outcome(sequence))
            }
            .scope_boxed()
        })
        .await
    }
}

#[async_trait::async_trait]
impl InventoryStore for DieselInventoryStore {
    async fn reconcile(
        &self,
        candidate: &ReconcileCandidate,
    ) -> Result<ReconcileOutcome, InventoryStoreError> {
        let max_attempts = self.policy.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            match self.reconcile_once(candidate).await {
                Ok(outcome) => return Ok(outcome),
                Err(AttemptError::Diesel(err)) if is_retryable_conflict(&err) => {
                    warn!(
                        node_id = %candidate.node_id,
                        kind = %candidate.kind(),
                        identity_key = %candidate.identity_key(),
                        attempt,
                        max_attempts,
                        error = %err,
                        "reconcile attempt hit contention; retrying"
                    );
                    last_error = err.to_string();
                }
                Err(err) => return Err(map_attempt_error(err)),
            }
        }

        Err(InventoryStoreError::conflict(format!(
            "gave up after {max_attempts} attempts: {last_error}"
        )))
    }

    async fn current_state(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
    ) -> Result<Vec<CurrentStateRecord>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sql_query(format!(
            "SELECT node_id, identity_key, payload, payload_digest, first_seen, last_changed, last_seen \
             FROM {table} WHERE node_id = $1 ORDER BY identity_key COLLATE \"C\"",
            table = kind.current_table()
        ))
        .bind::<Text, _>(node_id.as_ref())
        .load::<CurrentRow>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        rows.into_iter().map(|row| row.into_record(kind)).collect()
    }

    async fn change_history(
        &self,
        node_id: &EndpointId,
        kind: InventoryKind,
        identity_key: Option<IdentityKey>,
    ) -> Result<Vec<ChangeEvent>, InventoryStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = sql_query(format!(
            "SELECT id, node_id, identity_key, change_type, previous_payload, new_payload, \
                    changed_fields, detected_at \
             FROM {table} \
             WHERE node_id = $1 AND ($2::text IS NULL OR identity_key = $2) \
             ORDER BY detected_at, id",
            table = kind.changes_table()
        ))
        .bind::<Text, _>(node_id.as_ref())
        .bind::<Nullable<Text>, _>(identity_key.as_ref().map(AsRef::<str>::as_ref))
        .load::<ChangeRow>(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        rows.into_iter().map(|row| row.into_event(kind)).collect()
    }
}
