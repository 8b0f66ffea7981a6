//! QR check-in contract.

use crate::BoxFuture;
use crate::error::Result;
use crate::types::{BookingId, CheckIn, UserId};

/// Records attendee check-ins against bookings.
pub trait CheckInStore: Send + Sync {
    /// Records a check-in for a confirmed booking owned by `user_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such booking for this user
    /// - `AlreadyCancelled`: the booking's seats were released
    fn record_check_in(
        &self,
        booking_id: BookingId,
        user_id: UserId,
        qr_code: Option<String>,
    ) -> BoxFuture<'_, Result<CheckIn>>;

    /// Check-ins of a booking, newest first.
    ///
    /// # Errors
    ///
    /// - `NotFound`: the booking does not exist
    /// - `Unauthorized`: the booking belongs to someone else
    fn list_check_ins(
        &self,
        booking_id: BookingId,
        user_id: UserId,
    ) -> BoxFuture<'_, Result<Vec<CheckIn>>>;
}
