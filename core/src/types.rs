//! Domain types for the Seatbook platform.
//!
//! Value objects (identifiers, [`Money`], roles, statuses) and the entities
//! persisted by the storage layer: events, bookings, check-ins, payments and users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::LedgerError;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an event
    EventId
);
uuid_id!(
    /// Unique identifier for a booking
    BookingId
);
uuid_id!(
    /// Unique identifier for a user (organizer or explorer)
    UserId
);
uuid_id!(
    /// Unique identifier for a check-in record
    CheckInId
);
uuid_id!(
    /// Unique identifier for a payment record
    PaymentId
);

// ============================================================================
// Money
// ============================================================================

/// Monetary amount stored as an integer number of cents.
///
/// Serialized as the bare cent count, so `ticket_price: 2500` means 25.00.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Multiplies by a seat count with overflow checking
    #[must_use]
    pub const fn checked_mul(self, seats: u32) -> Option<Self> {
        match self.0.checked_mul(seats as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Converts to the signed representation used by `BIGINT` columns.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the amount exceeds `i64::MAX`.
    pub fn to_i64(self) -> Result<i64, LedgerError> {
        i64::try_from(self.0)
            .map_err(|_| LedgerError::Validation(format!("amount {} is out of range", self.0)))
    }

    /// Converts from a signed `BIGINT` column value.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the stored value is negative.
    pub fn from_i64(cents: i64) -> Result<Self, LedgerError> {
        u64::try_from(cents)
            .map(Self)
            .map_err(|_| LedgerError::Database(format!("negative amount {cents} in storage")))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Roles and statuses
// ============================================================================

/// Role of an authenticated user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Publishes and manages events
    Organizer,
    /// Browses and books events
    Explorer,
}

impl Role {
    /// Convert role to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Explorer => "explorer",
        }
    }

    /// Parse role from its string representation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the string is not a known role.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "organizer" => Ok(Self::Organizer),
            "explorer" => Ok(Self::Explorer),
            _ => Err(LedgerError::Validation(format!("Invalid role: {s}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a booking.
///
/// The only transition is `Confirmed → Cancelled`, performed once by a credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Seats are held by this booking
    Confirmed,
    /// Seats were released back to the event
    Cancelled,
}

impl BookingStatus {
    /// Convert status to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse status from database string.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] if the string doesn't match a known status.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(LedgerError::Database(format!("Invalid booking status: {s}"))),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// A published event with its seat inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Organizer who owns the event
    pub organizer_id: UserId,
    /// Title
    pub title: String,
    /// Optional long description
    pub description: Option<String>,
    /// Venue / location
    pub location: String,
    /// When the event takes place
    pub event_date: DateTime<Utc>,
    /// Price of a single seat
    pub ticket_price: Money,
    /// Seat capacity
    pub total_seats: u32,
    /// Seats not held by confirmed bookings
    pub available_seats: u32,
    /// Cover image URL
    pub image_url: Option<String>,
    /// Category used for browsing filters
    pub category: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Event details as shown on the event page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    /// The event itself
    #[serde(flatten)]
    pub event: Event,
    /// Organizer display name
    pub organizer_name: Option<String>,
    /// Organizer contact email
    pub organizer_email: Option<String>,
}

// ============================================================================
// Bookings
// ============================================================================

/// A seat booking created by a debit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Booked event
    pub event_id: EventId,
    /// Booking owner
    pub user_id: UserId,
    /// Number of seats held
    pub number_of_seats: u32,
    /// `number_of_seats × ticket_price` at booking time
    pub total_price: Money,
    /// Current status
    pub status: BookingStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// A booking joined with the event fields shown in booking lists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookingDetails {
    /// The booking itself
    #[serde(flatten)]
    pub booking: Booking,
    /// Event title
    pub title: Option<String>,
    /// Event date
    pub event_date: Option<DateTime<Utc>>,
    /// Event location
    pub location: Option<String>,
    /// Event cover image
    pub image_url: Option<String>,
}

/// A QR check-in recorded against a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Check-in ID
    pub id: CheckInId,
    /// Booking checked in
    pub booking_id: BookingId,
    /// Scanned QR payload, if any
    pub qr_code: Option<String>,
    /// When the check-in happened
    pub checkin_time: DateTime<Utc>,
}

// ============================================================================
// Payments
// ============================================================================

/// A recorded payment for a booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID
    pub id: PaymentId,
    /// Paid booking
    pub booking_id: BookingId,
    /// Amount, copied from the booking's total price
    pub amount: Money,
    /// Payment method label (card, upi, ...)
    pub payment_method: String,
    /// External transaction reference
    pub transaction_id: Option<String>,
    /// Payment status (always `completed` for recorded payments)
    pub status: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// A payment joined with its booking's event, as shown in payment history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    /// The payment itself
    #[serde(flatten)]
    pub payment: Payment,
    /// Event the booking belongs to
    pub event_id: Option<EventId>,
    /// Event title
    pub event_title: Option<String>,
}

/// Organizer bank account used for payouts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutDetails {
    /// Organizer owning the account
    pub organizer_id: UserId,
    /// Account holder
    pub account_holder_name: String,
    /// Account number
    pub account_number: String,
    /// Bank name
    pub bank_name: String,
    /// IFSC branch code
    pub ifsc_code: String,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Users
// ============================================================================

/// A registered user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: UserId,
    /// Display name
    pub name: String,
    /// 10-digit mobile number
    pub mobile: String,
    /// Optional email
    pub email: Option<String>,
    /// Role
    pub role: Role,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// The authenticated identity attached to a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Authenticated user
    pub user_id: UserId,
    /// Their role
    pub role: Role,
}

/// A bearer session issued to a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: Uuid,
    /// Session owner
    pub user_id: UserId,
    /// Expiry time
    pub expires_at: DateTime<Utc>,
}
