//! The Seat-Inventory Ledger contract.
//!
//! # Design
//!
//! [`Ledger`] exposes exactly the two operations that mutate shared seat
//! state. Implementations must execute each as a single atomic
//! read-check-write:
//!
//! ```text
//! Debit(event, n, user)                  Credit(booking, user)
//! ─────────────────────                  ─────────────────────
//! BEGIN                                  BEGIN
//! lock event row                         lock booking row
//! available < n ? → InsufficientCapacity owner ≠ user ? → Unauthorized
//! insert booking (confirmed)             cancelled ? → AlreadyCancelled
//! available -= n                         status = cancelled
//! COMMIT                                 lock event row, available += n
//!                                        COMMIT
//! ```
//!
//! No in-process lock is involved: mutual exclusion for the event row belongs
//! to the transactional store. Transient isolation failures surface as
//! [`LedgerError::Conflict`](crate::LedgerError::Conflict) and are retried by
//! the implementation with [`retry_on_conflict`](crate::retry::retry_on_conflict).
//!
//! # Implementations
//!
//! - `PostgresStore` (in `seatbook-postgres`): `SELECT ... FOR UPDATE` transactions
//! - `InMemoryStore` (in `seatbook-testing`): single mutex over all state

use crate::BoxFuture;
use crate::error::Result;
use crate::types::{Booking, BookingDetails, BookingId, EventId, UserId};

/// Debit/credit operations over per-event seat counters.
pub trait Ledger: Send + Sync {
    /// Reserves `requested_seats` on `event_id` for `user_id`, creating a
    /// confirmed booking priced at `requested_seats × ticket_price`.
    ///
    /// # Errors
    ///
    /// - `Validation`: `requested_seats == 0`
    /// - `NotFound`: the event does not exist
    /// - `InsufficientCapacity`: fewer seats available than requested (no writes)
    /// - `Conflict`: isolation failure persisted after bounded retries
    fn debit(
        &self,
        event_id: EventId,
        requested_seats: u32,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Booking>>;

    /// Cancels `booking_id` and releases its seats back to the event.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the booking does not exist
    /// - `Unauthorized`: the booking belongs to someone else
    /// - `AlreadyCancelled`: seats were already released (nothing changes)
    /// - `Conflict`: isolation failure persisted after bounded retries
    fn credit(&self, booking_id: BookingId, user_id: UserId) -> BoxFuture<'_, Result<()>>;
}

/// Read-side queries over a user's bookings.
pub trait BookingQuery: Send + Sync {
    /// All bookings of `user_id`, newest first, joined with event fields.
    ///
    /// # Errors
    ///
    /// Returns `Database` if the query fails.
    fn list_bookings(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<BookingDetails>>>;

    /// A single booking of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist or belongs to someone else.
    fn get_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<BookingDetails>>;
}
