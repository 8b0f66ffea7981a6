//! Booking endpoints: the HTTP face of the seat ledger.
//!
//! - POST /api/bookings - Debit seats into a new booking
//! - GET /api/bookings - The caller's bookings, newest first
//! - GET /api/bookings/:id - One of the caller's bookings
//! - PUT /api/bookings/:id/cancel - Credit the seats back
//! - POST /api/bookings/:id/checkin - Record a QR check-in
//! - GET /api/bookings/:id/checkins - Check-ins of a booking

use axum::{Json, extract::State, http::StatusCode};
use seatbook_core::types::{Booking, BookingDetails, BookingId, CheckIn, EventId};
use seatbook_web::{AppError, AppJson, AppPath};
use serde::Deserialize;

use super::MessageResponse;
use crate::auth::SessionUser;
use crate::server::state::AppState;

/// Request to book seats.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Event to book
    pub event_id: EventId,
    /// Seats requested (at least one)
    pub number_of_seats: u32,
}

/// Optional check-in payload.
#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    /// Scanned QR code
    pub qr_code: Option<String>,
}

/// Book seats for an event.
///
/// # Status Codes
///
/// - 201: booking confirmed
/// - 400: zero seats, or not enough seats left
/// - 404: unknown event
/// - 409: persistent lock conflict, safe to retry
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/bookings \
///   -H "Authorization: Bearer <session_token>" \
///   -H "Content-Type: application/json" \
///   -d '{"event_id": "550e8400-e29b-41d4-a716-446655440000", "number_of_seats": 2}'
/// ```
pub async fn create_booking(
    user: SessionUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = state
        .ledger
        .debit(request.event_id, request.number_of_seats, user.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// The caller's bookings with event title, date and location.
pub async fn list_bookings(
    user: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    Ok(Json(state.bookings.list_bookings(user.user_id).await?))
}

/// One of the caller's bookings. Other users' bookings are reported as missing.
pub async fn get_booking(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(booking_id): AppPath<BookingId>,
) -> Result<Json<BookingDetails>, AppError> {
    Ok(Json(
        state.bookings.get_booking(booking_id, user.user_id).await?,
    ))
}

/// Cancel a booking and release its seats.
///
/// A second cancellation is rejected with 400 and releases nothing.
pub async fn cancel_booking(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(booking_id): AppPath<BookingId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.ledger.credit(booking_id, user.user_id).await?;
    Ok(Json(MessageResponse::new("Booking cancelled successfully")))
}

/// Record a check-in for one of the caller's confirmed bookings.
///
/// The body is optional; `{"qr_code": "..."}` stores the scanned code.
pub async fn check_in(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(booking_id): AppPath<BookingId>,
    request: Option<AppJson<CheckInRequest>>,
) -> Result<(StatusCode, Json<CheckIn>), AppError> {
    let qr_code = request.and_then(|AppJson(r)| r.qr_code);
    let check_in = state
        .check_ins
        .record_check_in(booking_id, user.user_id, qr_code)
        .await?;
    Ok((StatusCode::CREATED, Json(check_in)))
}

/// Check-ins of one of the caller's bookings, newest first.
pub async fn list_check_ins(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(booking_id): AppPath<BookingId>,
) -> Result<Json<Vec<CheckIn>>, AppError> {
    Ok(Json(
        state
            .check_ins
            .list_check_ins(booking_id, user.user_id)
            .await?,
    ))
}
