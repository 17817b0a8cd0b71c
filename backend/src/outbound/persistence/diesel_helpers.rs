//! Shared Diesel error mapping for the inventory persistence adapter.
//!
//! - pool failures become connection errors;
//! - closed or unreachable connections become connection errors;
//! - lock and serialisation contention is classified as retryable;
//! - everything else is a query error.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Map common Diesel error variants into query/connection constructors.
pub fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    log_diesel_error(&error);

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DeserializationError(_) => query("stored row could not be decoded"),
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => connection("database connection error"),
        _ => query("database error"),
    }
}

/// `true` when the error is transient contention worth retrying in a fresh
/// transaction: serialisation failures, unique-key races on first insert,
/// deadlocks and `lock_timeout` expiry.
pub fn is_retryable_conflict(error: &DieselError) -> bool {
    let DieselError::DatabaseError(kind, info) = error else {
        return false;
    };
    match kind {
        DatabaseErrorKind::SerializationFailure | DatabaseErrorKind::UniqueViolation => true,
        _ => {
            let message = info.message().to_ascii_lowercase();
            message.contains("deadlock detected") || message.contains("lock timeout")
        }
    }
}

fn log_diesel_error(error: &DieselError) {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &'static str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info(message)))
    }

    #[rstest]
    #[case(db_error(DatabaseErrorKind::SerializationFailure, "could not serialize access"), true)]
    #[case(db_error(DatabaseErrorKind::UniqueViolation, "duplicate key value"), true)]
    #[case(db_error(DatabaseErrorKind::Unknown, "deadlock detected"), true)]
    #[case(db_error(DatabaseErrorKind::Unknown, "canceling statement due to lock timeout"), true)]
    #[case(db_error(DatabaseErrorKind::CheckViolation, "violates check constraint"), false)]
    #[case(DieselError::NotFound, false)]
    fn classifies_contention(#[case] error: DieselError, #[case] retryable: bool) {
        assert_eq!(is_retryable_conflict(&error), retryable);
    }

    #[rstest]
    fn closed_connections_map_to_connection_errors() {
        let mapped: (&str, &str) = map_basic_diesel_error(
            db_error(DatabaseErrorKind::ClosedConnection, "server closed the connection"),
            |message| ("query", message),
            |message| ("connection", message),
        );
        assert_eq!(mapped.0, "connection");
    }

    #[rstest]
    fn pool_errors_keep_their_message() {
        assert_eq!(
            map_pool_error_message(PoolError::checkout("timed out")),
            "timed out"
        );
    }
}
