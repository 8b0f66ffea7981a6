//! Payment recording contract.
//!
//! Payments read a booking's `total_price` snapshot; the ledger itself never
//! calls into this module.

use serde::Deserialize;

use crate::BoxFuture;
use crate::error::{LedgerError, Result};
use crate::types::{BookingId, Payment, PaymentRecord, PayoutDetails, UserId};

/// Status stored for every recorded payment.
pub const PAYMENT_COMPLETED: &str = "completed";

/// A payment to record against a booking.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NewPayment {
    /// Booking being paid
    pub booking_id: BookingId,
    /// Payment method label
    pub payment_method: String,
    /// External transaction reference
    pub transaction_id: Option<String>,
}

impl NewPayment {
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if `payment_method` is blank.
    pub fn validate(&self) -> Result<()> {
        if self.payment_method.trim().is_empty() {
            return Err(LedgerError::Validation("Missing required fields".to_string()));
        }
        Ok(())
    }
}

/// Organizer bank details to save.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PayoutDetailsInput {
    /// Account holder
    pub account_holder_name: String,
    /// Account number
    pub account_number: String,
    /// Bank name
    pub bank_name: String,
    /// IFSC branch code
    pub ifsc_code: String,
}

impl PayoutDetailsInput {
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if any field is blank.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            &self.account_holder_name,
            &self.account_number,
            &self.bank_name,
            &self.ifsc_code,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(LedgerError::Validation("Missing required fields".to_string()));
        }
        Ok(())
    }
}

/// Payment history and organizer payout details.
pub trait PaymentStore: Send + Sync {
    /// Records a completed payment for the full booking price.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the booking does not exist
    /// - `Unauthorized`: the booking belongs to someone else
    /// - `AlreadyCancelled`: the booking was cancelled
    fn record_payment(&self, payment: NewPayment, user_id: UserId)
    -> BoxFuture<'_, Result<Payment>>;

    /// Payments for bookings of `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// `Database` on storage failure.
    fn list_payments(&self, user_id: UserId) -> BoxFuture<'_, Result<Vec<PaymentRecord>>>;

    /// Inserts or replaces the organizer's payout details.
    ///
    /// # Errors
    ///
    /// `Database` on storage failure.
    fn save_payout_details(
        &self,
        organizer_id: UserId,
        details: PayoutDetailsInput,
    ) -> BoxFuture<'_, Result<PayoutDetails>>;

    /// The organizer's payout details.
    ///
    /// # Errors
    ///
    /// `NotFound` if none were saved.
    fn get_payout_details(&self, organizer_id: UserId) -> BoxFuture<'_, Result<PayoutDetails>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_details_require_all_fields() {
        let input = PayoutDetailsInput {
            account_holder_name: "A. Organizer".to_string(),
            account_number: "   ".to_string(),
            bank_name: "State Bank".to_string(),
            ifsc_code: "SBIN0000001".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
