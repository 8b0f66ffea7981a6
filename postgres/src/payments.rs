//! Payments and organizer payout details.

use seatbook_core::error::{LedgerError, Result};
use seatbook_core::payment::{NewPayment, PAYMENT_COMPLETED, PayoutDetailsInput};
use seatbook_core::types::{BookingStatus, Payment, PaymentRecord, PayoutDetails, UserId};
use seatbook_core::{BoxFuture, PaymentStore};
use uuid::Uuid;

use crate::PostgresStore;
use crate::error::db_error;
use crate::rows::{PAYMENT_COLUMNS, PaymentRow, PaymentRecordRow, PayoutRow};

const PAYOUT_COLUMNS: &str =
    "organizer_id, account_holder_name, account_number, bank_name, ifsc_code, updated_at";

impl PaymentStore for PostgresStore {
    fn record_payment(
        &self,
        payment: NewPayment,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Payment>> {
        Box::pin(async move {
            payment.validate()?;
            let mut tx = self
                .pool
                .begin()
                .await
                .map_err(db_error("Failed to start transaction"))?;

            let booking: Option<(Uuid, i64, String)> = sqlx::query_as(
                "SELECT user_id, total_price_cents, status FROM bookings WHERE id = $1 FOR SHARE",
            )
            .bind(payment.booking_id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to get booking"))?;

            let (owner, amount, status) =
                booking.ok_or_else(|| LedgerError::not_found("Booking", payment.booking_id))?;
            if owner != *user_id.as_uuid() {
                return Err(LedgerError::Unauthorized("Unauthorized".to_string()));
            }
            if BookingStatus::parse(&status)? == BookingStatus::Cancelled {
                return Err(LedgerError::AlreadyCancelled {
                    booking_id: payment.booking_id.to_string(),
                });
            }

            let row: PaymentRow = sqlx::query_as(&format!(
                "INSERT INTO payments (id, booking_id, amount_cents, payment_method, transaction_id, status)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING {PAYMENT_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(payment.booking_id.as_uuid())
            .bind(amount)
            .bind(&payment.payment_method)
            .bind(&payment.transaction_id)
            .bind(PAYMENT_COMPLETED)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to record payment"))?;

            tx.commit()
                .await
                .map_err(db_error("Failed to commit payment"))?;

            metrics::counter!("seatbook_payments_total").increment(1);
            tracing::info!(booking_id = %payment.booking_id, "Payment recorded");
            row.try_into()
        })
    }

    fn list_payments(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<PaymentRecord>>> {
        Box::pin(async move {
            let rows: Vec<PaymentRecordRow> = sqlx::query_as(
                "SELECT p.id, p.booking_id, p.amount_cents, p.payment_method, p.transaction_id,
                        p.status, p.created_at,
                        b.event_id, e.title AS event_title
                 FROM payments p
                 JOIN bookings b ON b.id = p.booking_id
                 LEFT JOIN events e ON e.id = b.event_id
                 WHERE b.user_id = $1
                 ORDER BY p.created_at DESC",
            )
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list payments"))?;

            rows.into_iter().map(PaymentRecord::try_from).collect()
        })
    }

    fn save_payout_details(
        &self,
        organizer_id: UserId,
        details: PayoutDetailsInput,
    ) -> BoxFuture<'_, Result<PayoutDetails>> {
        Box::pin(async move {
            details.validate()?;
            let row: PayoutRow = sqlx::query_as(&format!(
                "INSERT INTO organizer_payments
                     (organizer_id, account_holder_name, account_number, bank_name, ifsc_code)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (organizer_id) DO UPDATE
                 SET account_holder_name = EXCLUDED.account_holder_name,
                     account_number = EXCLUDED.account_number,
                     bank_name = EXCLUDED.bank_name,
                     ifsc_code = EXCLUDED.ifsc_code,
                     updated_at = now()
                 RETURNING {PAYOUT_COLUMNS}"
            ))
            .bind(organizer_id.as_uuid())
            .bind(&details.account_holder_name)
            .bind(&details.account_number)
            .bind(&details.bank_name)
            .bind(&details.ifsc_code)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to save payout details"))?;
            Ok(row.into())
        })
    }

    fn get_payout_details(&self, organizer_id: UserId) -> BoxFuture<'_, Result<PayoutDetails>> {
        Box::pin(async move {
            let row: Option<PayoutRow> = sqlx::query_as(&format!(
                "SELECT {PAYOUT_COLUMNS} FROM organizer_payments WHERE organizer_id = $1"
            ))
            .bind(organizer_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to get payout details"))?;

            row.map(PayoutDetails::from)
                .ok_or_else(|| LedgerError::not_found("Payment details", organizer_id))
        })
    }
}
