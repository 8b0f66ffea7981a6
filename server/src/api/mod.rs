//! REST API handlers, mounted under `/api`.
//!
//! Every handler returns `Result<_, AppError>`; domain errors convert with
//! `?` and render as `{code, message}` JSON.

pub mod bookings;
pub mod events;
pub mod payments;
pub mod users;

use serde::Serialize;

/// Plain acknowledgement body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
