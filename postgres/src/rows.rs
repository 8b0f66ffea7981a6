//! Row shapes returned by queries and their conversion into domain types.
//!
//! Integer columns are signed in `PostgreSQL`; conversions reject negative
//! values as storage corruption instead of casting.

use chrono::{DateTime, Utc};
use seatbook_core::error::{LedgerError, Result};
use seatbook_core::types::{
    Booking, BookingDetails, BookingStatus, CheckIn, Event, EventDetails, EventId, Identity, Money,
    Payment, PaymentRecord, PayoutDetails, Role, User,
};
use uuid::Uuid;

pub(crate) const EVENT_COLUMNS: &str = "id, organizer_id, title, description, location, \
     event_date, ticket_price_cents, total_seats, available_seats, image_url, category, \
     created_at, updated_at";

pub(crate) const BOOKING_COLUMNS: &str =
    "id, event_id, user_id, number_of_seats, total_price_cents, status, created_at, updated_at";

pub(crate) const PAYMENT_COLUMNS: &str =
    "id, booking_id, amount_cents, payment_method, transaction_id, status, created_at";

pub(crate) const USER_COLUMNS: &str = "id, name, mobile, email, role, created_at";

fn seats(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| LedgerError::Database(format!("negative {column} {value} in storage")))
}

/// Converts a seat count for an `INTEGER` column.
pub(crate) fn seats_to_i32(value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| LedgerError::Validation(format!("seat count {value} is too large")))
}

#[derive(sqlx::FromRow)]
pub(crate) struct EventRow {
    id: Uuid,
    organizer_id: Uuid,
    title: String,
    description: Option<String>,
    location: String,
    event_date: DateTime<Utc>,
    ticket_price_cents: i64,
    total_seats: i32,
    available_seats: i32,
    image_url: Option<String>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = LedgerError;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            organizer_id: row.organizer_id.into(),
            title: row.title,
            description: row.description,
            location: row.location,
            event_date: row.event_date,
            ticket_price: Money::from_i64(row.ticket_price_cents)?,
            total_seats: seats("total_seats", row.total_seats)?,
            available_seats: seats("available_seats", row.available_seats)?,
            image_url: row.image_url,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EventDetailsRow {
    #[sqlx(flatten)]
    event: EventRow,
    organizer_name: Option<String>,
    organizer_email: Option<String>,
}

impl TryFrom<EventDetailsRow> for EventDetails {
    type Error = LedgerError;

    fn try_from(row: EventDetailsRow) -> Result<Self> {
        Ok(Self {
            event: row.event.try_into()?,
            organizer_name: row.organizer_name,
            organizer_email: row.organizer_email,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingRow {
    id: Uuid,
    event_id: Uuid,
    user_id: Uuid,
    number_of_seats: i32,
    total_price_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = LedgerError;

    fn try_from(row: BookingRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            event_id: row.event_id.into(),
            user_id: row.user_id.into(),
            number_of_seats: seats("number_of_seats", row.number_of_seats)?,
            total_price: Money::from_i64(row.total_price_cents)?,
            status: BookingStatus::parse(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookingDetailsRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    title: Option<String>,
    event_date: Option<DateTime<Utc>>,
    location: Option<String>,
    image_url: Option<String>,
}

impl TryFrom<BookingDetailsRow> for BookingDetails {
    type Error = LedgerError;

    fn try_from(row: BookingDetailsRow) -> Result<Self> {
        Ok(Self {
            booking: row.booking.try_into()?,
            title: row.title,
            event_date: row.event_date,
            location: row.location,
            image_url: row.image_url,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CheckInRow {
    id: Uuid,
    booking_id: Uuid,
    qr_code: Option<String>,
    checkin_time: DateTime<Utc>,
}

impl From<CheckInRow> for CheckIn {
    fn from(row: CheckInRow) -> Self {
        Self {
            id: row.id.into(),
            booking_id: row.booking_id.into(),
            qr_code: row.qr_code,
            checkin_time: row.checkin_time,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    amount_cents: i64,
    payment_method: String,
    transaction_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = LedgerError;

    fn try_from(row: PaymentRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            booking_id: row.booking_id.into(),
            amount: Money::from_i64(row.amount_cents)?,
            payment_method: row.payment_method,
            transaction_id: row.transaction_id,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PaymentRecordRow {
    #[sqlx(flatten)]
    payment: PaymentRow,
    event_id: Option<Uuid>,
    event_title: Option<String>,
}

impl TryFrom<PaymentRecordRow> for PaymentRecord {
    type Error = LedgerError;

    fn try_from(row: PaymentRecordRow) -> Result<Self> {
        Ok(Self {
            payment: row.payment.try_into()?,
            event_id: row.event_id.map(EventId::from_uuid),
            event_title: row.event_title,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PayoutRow {
    organizer_id: Uuid,
    account_holder_name: String,
    account_number: String,
    bank_name: String,
    ifsc_code: String,
    updated_at: DateTime<Utc>,
}

impl From<PayoutRow> for PayoutDetails {
    fn from(row: PayoutRow) -> Self {
        Self {
            organizer_id: row.organizer_id.into(),
            account_holder_name: row.account_holder_name,
            account_number: row.account_number,
            bank_name: row.bank_name,
            ifsc_code: row.ifsc_code,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    name: String,
    mobile: String,
    email: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

/// A user row plus its stored password hash.
#[derive(sqlx::FromRow)]
pub(crate) struct UserCredentialRow {
    #[sqlx(flatten)]
    pub(crate) user: UserRow,
    pub(crate) password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = LedgerError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            name: row.name,
            mobile: row.mobile,
            email: row.email,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
        })
    }
}

/// Builds an [`Identity`] from a `(user id, role)` row.
pub(crate) fn identity(user_id: Uuid, role: &str) -> Result<Identity> {
    Ok(Identity {
        user_id: user_id.into(),
        role: parse_role(role)?,
    })
}

fn parse_role(role: &str) -> Result<Role> {
    Role::parse(role).map_err(|_| LedgerError::Database(format!("Invalid role in storage: {role}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_seats_are_corruption() {
        assert!(matches!(seats("total_seats", -1), Err(LedgerError::Database(_))));
        assert_eq!(seats("total_seats", 12).ok(), Some(12));
    }

    #[test]
    fn test_seat_count_must_fit_integer_column() {
        assert!(seats_to_i32(u32::MAX).is_err());
        assert_eq!(seats_to_i32(40).ok(), Some(40));
    }

    #[test]
    fn test_unknown_role_in_storage() {
        assert!(matches!(identity(Uuid::new_v4(), "admin"), Err(LedgerError::Database(_))));
    }
}
