//! Mapping from `sqlx` errors onto [`LedgerError`].

use seatbook_core::error::LedgerError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Whether a SQLSTATE denotes a transient isolation failure worth retrying.
///
/// Covers serialization failures, deadlocks, lock timeouts and statement
/// timeouts.
#[must_use]
pub fn is_conflict_code(code: &str) -> bool {
    matches!(
        code,
        SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE | QUERY_CANCELED
    )
}

/// Classifies a `sqlx` error, prefixing the message with `context`.
pub(crate) fn classify(context: &str, err: &sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(db) = err {
        let code = db.code();
        match code.as_deref() {
            Some(c) if is_conflict_code(c) => {
                return LedgerError::Conflict(format!("{context}: {db}"));
            }
            Some(UNIQUE_VIOLATION) => {
                return LedgerError::AlreadyExists(format!("{context}: {db}"));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return LedgerError::Validation(format!("{context}: {db}"));
            }
            _ => {}
        }
    }
    LedgerError::Database(format!("{context}: {err}"))
}

/// `map_err` adapter around [`classify`].
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> LedgerError {
    move |err| {
        let classified = classify(context, &err);
        if !matches!(classified, LedgerError::Conflict(_)) {
            tracing::debug!(error = %err, context, "Database operation failed");
        }
        classified
    }
}
