//! Error taxonomy shared by the ledger, the storage crates and the HTTP layer.
//!
//! | Kind                   | Meaning                                     | Retried |
//! |------------------------|---------------------------------------------|---------|
//! | `Validation`           | malformed input (seats < 1, empty fields)   | no      |
//! | `NotFound`             | event, booking or user absent               | no      |
//! | `Unauthorized`         | actor does not own the resource / wrong role| no      |
//! | `InvalidCredentials`   | unknown login or wrong password             | no      |
//! | `InsufficientCapacity` | business rule: not enough seats             | no      |
//! | `AlreadyCancelled`     | business rule: booking already released     | no      |
//! | `AlreadyExists`        | unique constraint on registration           | no      |
//! | `Conflict`             | transient isolation failure                 | yes     |
//! | `Database`             | anything else from the storage layer        | no      |

use thiserror::Error;

/// Result type alias for Seatbook operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors produced by ledger, catalog and directory operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced resource does not exist.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Resource kind (`Event`, `Booking`, ...).
        resource: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The acting user may not perform this operation on the resource.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login identifier or password did not match a user.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Debit requested more seats than are available. No writes were made.
    #[error("Not enough seats available. Available: {available}, requested: {requested}")]
    InsufficientCapacity {
        /// Seats available when the request was checked.
        available: u32,
        /// Seats requested.
        requested: u32,
    },

    /// Credit on a booking whose seats were already released.
    #[error("Booking {booking_id} already cancelled")]
    AlreadyCancelled {
        /// The cancelled booking.
        booking_id: String,
    },

    /// A unique resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Transient isolation failure (serialization failure, deadlock, lock timeout).
    #[error("Concurrency conflict: {0}")]
    Conflict(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Shorthand for [`LedgerError::NotFound`].
    #[must_use]
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Whether the operation may succeed if retried unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
