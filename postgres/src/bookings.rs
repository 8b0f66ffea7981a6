//! Booking read queries.

use seatbook_core::error::{LedgerError, Result};
use seatbook_core::types::{BookingDetails, BookingId, UserId};
use seatbook_core::{BookingQuery, BoxFuture};

use crate::PostgresStore;
use crate::error::db_error;
use crate::rows::BookingDetailsRow;

const BOOKING_DETAILS_SELECT: &str = "SELECT b.id, b.event_id, b.user_id, b.number_of_seats,
            b.total_price_cents, b.status, b.created_at, b.updated_at,
            e.title, e.event_date, e.location, e.image_url
     FROM bookings b
     LEFT JOIN events e ON e.id = b.event_id";

impl BookingQuery for PostgresStore {
    fn list_bookings(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<BookingDetails>>> {
        Box::pin(async move {
            let rows: Vec<BookingDetailsRow> = sqlx::query_as(&format!(
                "{BOOKING_DETAILS_SELECT}
                 WHERE b.user_id = $1
                 ORDER BY b.created_at DESC"
            ))
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list bookings"))?;

            rows.into_iter().map(BookingDetails::try_from).collect()
        })
    }

    fn get_booking(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<BookingDetails>> {
        Box::pin(async move {
            let row: Option<BookingDetailsRow> = sqlx::query_as(&format!(
                "{BOOKING_DETAILS_SELECT}
                 WHERE b.id = $1 AND b.user_id = $2"
            ))
            .bind(booking_id.as_uuid())
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get booking"))?;

            row.ok_or_else(|| LedgerError::not_found("Booking", booking_id))?
                .try_into()
        })
    }
}
