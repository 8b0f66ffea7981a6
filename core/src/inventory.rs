//! Bounded seat counter for a single event.
//!
//! [`Inventory`] is the pure arithmetic behind the ledger: every mutation
//! returns a new value or an error, and a value can only exist while
//! `0 ≤ available_seats ≤ total_seats`. Storage implementations lock the
//! event row, load an `Inventory`, apply the operation, and persist the
//! result in the same transaction.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Seat capacity and availability of one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    total_seats: u32,
    available_seats: u32,
}

impl Inventory {
    /// Creates an inventory snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if `available_seats > total_seats`.
    pub fn new(total_seats: u32, available_seats: u32) -> Result<Self> {
        if available_seats > total_seats {
            return Err(LedgerError::Validation(format!(
                "available seats {available_seats} exceed capacity {total_seats}"
            )));
        }
        Ok(Self {
            total_seats,
            available_seats,
        })
    }

    /// A freshly published event: every seat is available.
    #[must_use]
    pub const fn with_capacity(total_seats: u32) -> Self {
        Self {
            total_seats,
            available_seats: total_seats,
        }
    }

    /// Loads an inventory from signed `INTEGER` columns.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the stored values are negative or inconsistent.
    pub fn from_columns(total_seats: i32, available_seats: i32) -> Result<Self> {
        let total = u32::try_from(total_seats)
            .map_err(|_| LedgerError::Database(format!("negative total_seats {total_seats}")))?;
        let available = u32::try_from(available_seats).map_err(|_| {
            LedgerError::Database(format!("negative available_seats {available_seats}"))
        })?;
        Self::new(total, available)
            .map_err(|e| LedgerError::Database(format!("corrupt inventory: {e}")))
    }

    /// Seat capacity.
    #[must_use]
    pub const fn total_seats(&self) -> u32 {
        self.total_seats
    }

    /// Seats not held by confirmed bookings.
    #[must_use]
    pub const fn available_seats(&self) -> u32 {
        self.available_seats
    }

    /// Seats held by confirmed bookings.
    #[must_use]
    pub const fn booked_seats(&self) -> u32 {
        self.total_seats - self.available_seats
    }

    /// Reserves `seats` for a new booking.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Validation`] if `seats == 0`
    /// - [`LedgerError::InsufficientCapacity`] if fewer than `seats` are available
    pub fn debit(self, seats: u32) -> Result<Self> {
        validate_seat_request(seats)?;
        if self.available_seats < seats {
            return Err(LedgerError::InsufficientCapacity {
                available: self.available_seats,
                requested: seats,
            });
        }
        Ok(Self {
            available_seats: self.available_seats - seats,
            ..self
        })
    }

    /// Releases `seats` held by a cancelled booking.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the release would exceed capacity,
    /// which means the stored bookings and counter disagree.
    pub fn credit(self, seats: u32) -> Result<Self> {
        match self.available_seats.checked_add(seats) {
            Some(available) if available <= self.total_seats => Ok(Self {
                available_seats: available,
                ..self
            }),
            _ => Err(LedgerError::Database(format!(
                "releasing {seats} seats would exceed capacity {} (available {})",
                self.total_seats, self.available_seats
            ))),
        }
    }

    /// Applies a signed seat delta, the primitive behind debit and credit.
    ///
    /// # Errors
    ///
    /// Negative deltas fail like [`Inventory::debit`], positive ones like
    /// [`Inventory::credit`].
    pub fn apply_delta(self, delta: i64) -> Result<Self> {
        let magnitude = u32::try_from(delta.unsigned_abs())
            .map_err(|_| LedgerError::Validation(format!("seat delta {delta} is out of range")))?;
        match delta {
            0 => Ok(self),
            d if d < 0 => self.debit(magnitude),
            _ => self.credit(magnitude),
        }
    }

    /// Changes capacity, shifting availability by the same amount.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the new capacity is below the
    /// seats already booked.
    pub fn resize(self, new_total: u32) -> Result<Self> {
        let booked = self.booked_seats();
        if new_total < booked {
            return Err(LedgerError::Validation(format!(
                "total_seats cannot be reduced to {new_total}: {booked} seats are already booked"
            )));
        }
        Ok(Self {
            total_seats: new_total,
            available_seats: new_total - booked,
        })
    }
}

/// Rejects seat requests below one.
///
/// # Errors
///
/// Returns [`LedgerError::Validation`] if `seats == 0`.
pub fn validate_seat_request(seats: u32) -> Result<()> {
    if seats == 0 {
        return Err(LedgerError::Validation("At least 1 seat required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_rejects_overfull() {
        assert!(Inventory::new(5, 6).is_err());
        assert!(Inventory::new(5, 5).is_ok());
    }

    #[test]
    fn test_debit_and_credit_scenario() {
        let inventory = Inventory::with_capacity(10);

        let after_first = inventory.debit(5).unwrap_or(inventory);
        assert_eq!(after_first.available_seats(), 5);

        let rejected = after_first.debit(6);
        assert_eq!(
            rejected,
            Err(LedgerError::InsufficientCapacity { available: 5, requested: 6 })
        );

        let restored = after_first.credit(5).unwrap_or(after_first);
        assert_eq!(restored.available_seats(), 10);
    }

    #[test]
    fn test_debit_zero_is_validation_error() {
        assert!(matches!(
            Inventory::with_capacity(3).debit(0),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_credit_past_capacity_is_rejected() {
        assert!(Inventory::with_capacity(3).credit(1).is_err());
    }

    #[test]
    fn test_apply_delta_directions() {
        let inventory = Inventory::with_capacity(4);
        assert_eq!(inventory.apply_delta(-3).map(|i| i.available_seats()), Ok(1));
        assert_eq!(inventory.apply_delta(0), Ok(inventory));
        assert!(inventory.apply_delta(1).is_err());
        assert!(inventory.apply_delta(i64::MIN).is_err());
    }

    #[test]
    fn test_resize_keeps_booked_seats() {
        let inventory = Inventory::new(10, 4).unwrap_or(Inventory::with_capacity(0));
        let grown = inventory.resize(15);
        assert_eq!(grown.map(|i| (i.total_seats(), i.available_seats())), Ok((15, 9)));

        let shrunk = inventory.resize(6);
        assert_eq!(shrunk.map(|i| (i.total_seats(), i.available_seats())), Ok((6, 0)));

        assert!(inventory.resize(5).is_err());
    }

    #[test]
    fn test_from_columns_rejects_negative() {
        assert!(matches!(Inventory::from_columns(-1, 0), Err(LedgerError::Database(_))));
        assert!(matches!(Inventory::from_columns(3, 4), Err(LedgerError::Database(_))));
    }

    proptest! {
        #[test]
        fn prop_delta_never_leaves_bounds(
            total in 0u32..500,
            deltas in proptest::collection::vec(-50i64..50, 0..40),
        ) {
            let mut inventory = Inventory::with_capacity(total);
            for delta in deltas {
                if let Ok(next) = inventory.apply_delta(delta) {
                    inventory = next;
                }
                prop_assert!(inventory.available_seats() <= inventory.total_seats());
                prop_assert_eq!(inventory.total_seats(), total);
            }
        }
    }
}
