//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use axum::{Json, http::StatusCode};
use seatbook_core::LedgerError;
use serde::Serialize;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies (database, etc.).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness of one dependency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Component that was probed
    pub component: &'static str,
    /// `ready` or `unavailable`
    pub status: &'static str,
    /// Failure detail, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Maps a dependency probe into a readiness response.
///
/// # Status Codes
///
/// - 200 OK: the probe succeeded
/// - 503 Service Unavailable: the probe failed
///
/// # Response
///
/// ```json
/// { "component": "database", "status": "ready" }
/// ```
#[must_use]
pub fn readiness(
    component: &'static str,
    probe: Result<(), LedgerError>,
) -> (StatusCode, Json<HealthReport>) {
    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthReport {
                component,
                status: "ready",
                message: None,
            }),
        ),
        Err(error) => {
            tracing::warn!(component, error = %error, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthReport {
                    component,
                    status: "unavailable",
                    message: Some(error.to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[test]
    fn test_readiness_reports_failure() {
        let (status, Json(report)) =
            readiness("database", Err(LedgerError::Database("refused".to_string())));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "unavailable");

        let (status, Json(report)) = readiness("database", Ok(()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.message, None);
    }
}
