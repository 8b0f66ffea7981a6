//! Payment endpoints.
//!
//! - POST /api/payments - Record a payment for a booking
//! - GET /api/payments - The caller's payment history
//! - POST /api/payments/organizer/details - Save payout details (organizers only)
//! - GET /api/payments/organizer/details - Read payout details (organizers only)

use axum::{Json, extract::State, http::StatusCode};
use seatbook_core::payment::{NewPayment, PayoutDetailsInput};
use seatbook_core::types::{Payment, PaymentRecord, PayoutDetails};
use seatbook_web::{AppError, AppJson};

use crate::auth::{RequireOrganizer, SessionUser};
use crate::server::state::AppState;

/// Record a payment. The amount is the booking's total price.
pub async fn record_payment(
    user: SessionUser,
    State(state): State<AppState>,
    AppJson(request): AppJson<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    let payment = state.payments.record_payment(request, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Payments for the caller's bookings, newest first.
pub async fn list_payments(
    user: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<PaymentRecord>>, AppError> {
    Ok(Json(state.payments.list_payments(user.user_id).await?))
}

/// Insert or replace the organizer's payout account.
pub async fn save_payout_details(
    organizer: RequireOrganizer,
    State(state): State<AppState>,
    AppJson(details): AppJson<PayoutDetailsInput>,
) -> Result<(StatusCode, Json<PayoutDetails>), AppError> {
    let saved = state
        .payments
        .save_payout_details(organizer.user_id, details)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// The organizer's payout account.
pub async fn get_payout_details(
    organizer: RequireOrganizer,
    State(state): State<AppState>,
) -> Result<Json<PayoutDetails>, AppError> {
    Ok(Json(
        state.payments.get_payout_details(organizer.user_id).await?,
    ))
}
