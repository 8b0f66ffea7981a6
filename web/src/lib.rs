//! Axum integration for Seatbook.
//!
//! Shared HTTP plumbing used by the server crate:
//!
//! - [`AppError`]: maps [`LedgerError`](seatbook_core::LedgerError) and
//!   request rejections to `{code, message}` JSON responses
//! - [`correlation_id_layer`]: per-request correlation IDs and tracing spans
//! - [`CorrelationId`] and [`BearerToken`] extractors, plus [`AppJson`],
//!   [`AppPath`] and [`AppQuery`] with [`AppError`] rejections
//! - liveness/readiness handlers
//!
//! # Example
//!
//! ```ignore
//! use seatbook_web::{AppError, correlation_id_layer};
//! use axum::{Router, routing::get, extract::State, Json};
//!
//! async fn get_event(
//!     State(state): State<AppState>,
//!     Path(id): Path<EventId>,
//! ) -> Result<Json<EventDetails>, AppError> {
//!     Ok(Json(state.catalog.get_event_details(id).await?))
//! }
//!
//! let app = Router::new()
//!     .route("/api/events/:id", get(get_event))
//!     .layer(correlation_id_layer())
//!     .with_state(app_state);
//! ```

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{AppJson, AppPath, AppQuery, BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
