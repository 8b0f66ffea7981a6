//! Router configuration for Seatbook.
//!
//! Builds the complete Axum router with all endpoints.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use seatbook_web::correlation_id_layer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{bookings, events, payments, users};

/// Build the complete Axum router.
///
/// - `/health` and `/ready` at the root (no authentication)
/// - everything else under `/api`
/// - tracing, correlation ID and CORS layers on every route
#[must_use]
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api_routes = Router::new()
        // Accounts
        .route("/auth/signup", post(users::signup))
        .route("/auth/login", post(users::login))
        .route(
            "/auth/profile",
            get(users::profile).put(users::update_profile),
        )
        // Event catalog
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Bookings (seat ledger)
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route("/bookings/:id", get(bookings::get_booking))
        .route("/bookings/:id/cancel", put(bookings::cancel_booking))
        .route("/bookings/:id/checkin", post(bookings::check_in))
        .route("/bookings/:id/checkins", get(bookings::list_check_ins))
        // Payments
        .route(
            "/payments",
            post(payments::record_payment).get(payments::list_payments),
        )
        .route(
            "/payments/organizer/details",
            post(payments::save_payout_details).get(payments::get_payout_details),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .with_state(state)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS policy for the browser frontend.
///
/// Origins that are not valid header values are skipped with a warning.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
