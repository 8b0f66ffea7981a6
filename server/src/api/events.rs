//! Event catalog endpoints.
//!
//! - POST /api/events - Publish an event (organizers only)
//! - GET /api/events - Upcoming events with filters and paging
//! - GET /api/events/:id - Event details with organizer contact
//! - PUT /api/events/:id - Partial update (owner only)
//! - DELETE /api/events/:id - Delete an event without bookings (owner only)

use axum::{Json, extract::State, http::StatusCode};
use seatbook_core::catalog::{EventFilter, EventPage, EventUpdate, NewEvent};
use seatbook_core::types::{Event, EventDetails, EventId};
use seatbook_web::{AppError, AppJson, AppPath, AppQuery};

use super::MessageResponse;
use crate::auth::{RequireOrganizer, SessionUser};
use crate::server::state::AppState;

/// Publish a new event. The caller becomes its organizer.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/events \
///   -H "Authorization: Bearer <session_token>" \
///   -H "Content-Type: application/json" \
///   -d '{
///     "title": "Jazz Night",
///     "location": "Riverside Hall",
///     "event_date": "2026-06-01T19:00:00Z",
///     "ticket_price": 2500,
///     "total_seats": 120,
///     "category": "music"
///   }'
/// ```
pub async fn create_event(
    organizer: RequireOrganizer,
    State(state): State<AppState>,
    AppJson(request): AppJson<NewEvent>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let event = state
        .catalog
        .create_event(organizer.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List upcoming events ordered by date.
///
/// Public endpoint. Supports `category`, `search`, `limit` and `offset`.
///
/// ```bash
/// curl "http://localhost:3000/api/events?category=music&search=jazz&limit=10"
/// ```
pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<EventFilter>,
) -> Result<Json<EventPage>, AppError> {
    Ok(Json(state.catalog.list_events(filter).await?))
}

/// Event details, including the organizer's name and email.
pub async fn get_event(
    State(state): State<AppState>,
    AppPath(event_id): AppPath<EventId>,
) -> Result<Json<EventDetails>, AppError> {
    Ok(Json(state.catalog.get_event_details(event_id).await?))
}

/// Update any subset of an event's fields.
///
/// `null` clears `description`, `image_url` or `category`.
/// Resizing `total_seats` keeps every confirmed booking's seats held; a
/// capacity below the booked seats is rejected.
pub async fn update_event(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(event_id): AppPath<EventId>,
    AppJson(update): AppJson<EventUpdate>,
) -> Result<Json<Event>, AppError> {
    let event = state
        .catalog
        .update_event(event_id, user.user_id, update)
        .await?;
    Ok(Json(event))
}

/// Delete an event that has no bookings.
pub async fn delete_event(
    user: SessionUser,
    State(state): State<AppState>,
    AppPath(event_id): AppPath<EventId>,
) -> Result<Json<MessageResponse>, AppError> {
    state.catalog.delete_event(event_id, user.user_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}
