//! Attendee check-ins.

use seatbook_core::error::{LedgerError, Result};
use seatbook_core::types::{BookingId, BookingStatus, CheckIn, UserId};
use seatbook_core::{BoxFuture, CheckInStore};
use uuid::Uuid;

use crate::PostgresStore;
use crate::error::db_error;
use crate::rows::CheckInRow;

impl CheckInStore for PostgresStore {
    fn record_check_in(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        qr_code: Option<String>,
    ) -> BoxFuture<'_, Result<CheckIn>> {
        Box::pin(async move {
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(db_error("Failed to start transaction"))?;

            // FOR SHARE blocks a concurrent cancellation until the check-in commits.
            let status: Option<(String,)> = sqlx::query_as(
                "SELECT status FROM bookings WHERE id = $1 AND user_id = $2 FOR SHARE",
            )
            .bind(booking_id.as_uuid())
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to get booking"))?;

            let (status,) = status.ok_or_else(|| LedgerError::not_found("Booking", booking_id))?;
            if BookingStatus::parse(&status)? == BookingStatus::Cancelled {
                return Err(LedgerError::AlreadyCancelled {
                    booking_id: booking_id.to_string(),
                });
            }

            let row: CheckInRow = sqlx::query_as(
                "INSERT INTO checkins (id, booking_id, qr_code)
                 VALUES ($1, $2, $3)
                 RETURNING id, booking_id, qr_code, checkin_time",
            )
            .bind(Uuid::new_v4())
            .bind(booking_id.as_uuid())
            .bind(&qr_code)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to record check-in"))?;

            tx.commit()
                .await
                .map_err(db_error("Failed to commit check-in"))?;

            tracing::info!(booking_id = %booking_id, "Booking checked in");
            Ok(row.into())
        })
    }

    fn list_check_ins(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Vec<CheckIn>>> {
        Box::pin(async move {
            let owner: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM bookings WHERE id = $1")
                .bind(booking_id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("Failed to get booking"))?;

            let (owner,) = owner.ok_or_else(|| LedgerError::not_found("Booking", booking_id))?;
            if owner != *user_id.as_uuid() {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }

            let rows: Vec<CheckInRow> = sqlx::query_as(
                "SELECT id, booking_id, qr_code, checkin_time
                 FROM checkins
                 WHERE booking_id = $1
                 ORDER BY checkin_time DESC",
            )
            .bind(booking_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list check-ins"))?;

            Ok(rows.into_iter().map(CheckIn::from).collect())
        })
    }
}
