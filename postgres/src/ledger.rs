//! Transactional seat ledger.
//!
//! Each debit/credit runs in one transaction under READ COMMITTED:
//!
//! 1. `SELECT ... FOR UPDATE` locks the row being checked (event for a
//!    debit, booking then event for a credit)
//! 2. [`apply_locked_delta`] checks the signed seat delta on [`Inventory`]
//!    and writes the new counter; `EventCatalog::apply_delta` runs the same
//!    step on its own
//! 3. the booking row is inserted or cancelled
//! 4. `COMMIT` releases the locks
//!
//! Concurrent debits on the same event queue on the row lock, so the
//! capacity check always sees the latest committed counter. A rejected
//! debit drops the transaction without writing. Transient failures
//! (deadlock, lock timeout) are retried with the store's [`RetryPolicy`].
//!
//! [`RetryPolicy`]: seatbook_core::retry::RetryPolicy

use std::future::Future;

use seatbook_core::error::{LedgerError, Result};
use seatbook_core::inventory::{Inventory, validate_seat_request};
use seatbook_core::retry::retry_on_conflict;
use seatbook_core::types::{Booking, BookingId, BookingStatus, EventId, Money, UserId};
use seatbook_core::{BoxFuture, Ledger};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::PostgresStore;
use crate::error::db_error;
use crate::rows::{BOOKING_COLUMNS, BookingRow, seats_to_i32};

/// Locks an event row and returns its inventory and seat price.
async fn lock_inventory(
    conn: &mut PgConnection,
    event_id: EventId,
) -> Result<Option<(Inventory, Money)>> {
    let row: Option<(i32, i32, i64)> = sqlx::query_as(
        "SELECT total_seats, available_seats, ticket_price_cents
         FROM events
         WHERE id = $1
         FOR UPDATE",
    )
    .bind(event_id.as_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error("Failed to lock event"))?;

    row.map(|(total, available, price)| {
        Ok((Inventory::from_columns(total, available)?, Money::from_i64(price)?))
    })
    .transpose()
}

/// Persists an inventory computed while the event row was locked.
async fn store_inventory(
    conn: &mut PgConnection,
    event_id: EventId,
    inventory: Inventory,
) -> Result<()> {
    sqlx::query(
        "UPDATE events
         SET total_seats = $2, available_seats = $3, updated_at = now()
         WHERE id = $1",
    )
    .bind(event_id.as_uuid())
    .bind(seats_to_i32(inventory.total_seats())?)
    .bind(seats_to_i32(inventory.available_seats())?)
    .execute(&mut *conn)
    .await
    .map_err(db_error("Failed to update seat inventory"))?;
    Ok(())
}

/// Locks an event row, shifts `available_seats` by `delta` and writes it back.
///
/// Returns the new inventory and the seat price, or `None` if the event does
/// not exist. A rejected delta writes nothing.
pub(crate) async fn apply_locked_delta(
    conn: &mut PgConnection,
    event_id: EventId,
    delta: i64,
) -> Result<Option<(Inventory, Money)>> {
    let Some((inventory, price)) = lock_inventory(conn, event_id).await? else {
        return Ok(None);
    };
    let after = inventory.apply_delta(delta)?;
    store_inventory(conn, event_id, after).await?;
    Ok(Some((after, price)))
}

/// Counts conflicts before they reach the retry loop.
pub(crate) async fn observe_conflicts<T>(attempt: impl Future<Output = Result<T>>) -> Result<T> {
    let result = attempt.await;
    if matches!(result, Err(LedgerError::Conflict(_))) {
        metrics::counter!("seatbook_ledger_conflicts_total").increment(1);
    }
    result
}

impl PostgresStore {
    #[tracing::instrument(skip(self))]
    async fn try_debit(&self, event_id: EventId, seats: u32, user_id: UserId) -> Result<Booking> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        // Dropping `tx` on any early return rolls back the lock and the write.
        let (_, price) = apply_locked_delta(&mut tx, event_id, -i64::from(seats))
            .await?
            .ok_or_else(|| LedgerError::not_found("Event", event_id))?;
        let total_price = price
            .checked_mul(seats)
            .ok_or_else(|| LedgerError::Validation("total price overflows".to_string()))?;

        let row: BookingRow = sqlx::query_as(&format!(
            "INSERT INTO bookings (id, event_id, user_id, number_of_seats, total_price_cents, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(event_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(seats_to_i32(seats)?)
        .bind(total_price.to_i64()?)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert booking"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit debit"))?;

        row.try_into()
    }

    #[tracing::instrument(skip(self))]
    async fn try_credit(&self, booking_id: BookingId, user_id: UserId) -> Result<u32> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to start transaction"))?;

        let booking: Option<(Uuid, Uuid, i32, String)> = sqlx::query_as(
            "SELECT event_id, user_id, number_of_seats, status
             FROM bookings
             WHERE id = $1
             FOR UPDATE",
        )
        .bind(booking_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to lock booking"))?;

        let (event_id, owner, seats, status) =
            booking.ok_or_else(|| LedgerError::not_found("Booking", booking_id))?;

        if owner != *user_id.as_uuid() {
            return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
        }
        if BookingStatus::parse(&status)? == BookingStatus::Cancelled {
            return Err(LedgerError::AlreadyCancelled {
                booking_id: booking_id.to_string(),
            });
        }
        let seats = u32::try_from(seats)
            .map_err(|_| LedgerError::Database(format!("negative number_of_seats {seats}")))?;

        sqlx::query("UPDATE bookings SET status = $2, updated_at = now() WHERE id = $1")
            .bind(booking_id.as_uuid())
            .bind(BookingStatus::Cancelled.as_str())
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to cancel booking"))?;

        let event_id = EventId::from_uuid(event_id);
        apply_locked_delta(&mut tx, event_id, i64::from(seats))
            .await?
            .ok_or_else(|| {
                LedgerError::Database(format!(
                    "booking {booking_id} references missing event {event_id}"
                ))
            })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit credit"))?;

        Ok(seats)
    }
}

impl Ledger for PostgresStore {
    fn debit(
        &self,
        event_id: EventId,
        requested_seats: u32,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Booking>> {
        Box::pin(async move {
            validate_seat_request(requested_seats)?;

            let result = retry_on_conflict(&self.retry, "debit", || {
                observe_conflicts(self.try_debit(event_id, requested_seats, user_id))
            })
            .await;

            match &result {
                Ok(booking) => {
                    metrics::counter!("seatbook_bookings_total", "status" => "confirmed").increment(1);
                    metrics::counter!("seatbook_seats_debited_total")
                        .increment(u64::from(requested_seats));
                    tracing::info!(
                        booking_id = %booking.id,
                        event_id = %event_id,
                        seats = requested_seats,
                        "Seats debited"
                    );
                }
                Err(LedgerError::InsufficientCapacity { available, requested }) => {
                    metrics::counter!("seatbook_bookings_total", "status" => "rejected").increment(1);
                    tracing::info!(event_id = %event_id, available, requested, "Debit rejected");
                }
                Err(_) => {}
            }
            result
        })
    }

    fn credit(&self, booking_id: BookingId, user_id: UserId) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let seats = retry_on_conflict(&self.retry, "credit", || {
                observe_conflicts(self.try_credit(booking_id, user_id))
            })
            .await?;

            metrics::counter!("seatbook_bookings_total", "status" => "cancelled").increment(1);
            metrics::counter!("seatbook_seats_credited_total").increment(u64::from(seats));
            tracing::info!(booking_id = %booking_id, seats, "Seats credited");
            Ok(())
        })
    }
}
