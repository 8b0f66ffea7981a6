//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use seatbook_web::handlers::{HealthReport, readiness};

use super::state::AppState;

pub use seatbook_web::handlers::health_check;

/// Readiness check endpoint.
///
/// Returns 200 when the backing store answers and 503 otherwise, so load
/// balancers stop routing to an instance that lost its database.
///
/// # Example
///
/// ```bash
/// curl http://localhost:3000/ready
/// # {"component":"database","status":"ready"}
/// ```
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let probe = state.readiness.check_ready().await;
    if let Err(e) = &probe {
        tracing::warn!(error = %e, "Readiness check failed");
    }
    readiness(state.readiness.component(), probe)
}
