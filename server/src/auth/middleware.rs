//! Authentication extractors.
//!
//! - [`SessionUser`]: any signed-in user (401 without a live session)
//! - [`RequireOrganizer`]: a signed-in organizer (403 for explorers)
//!
//! # Usage
//!
//! ```rust,ignore
//! use seatbook::auth::{RequireOrganizer, SessionUser};
//!
//! // Require authentication
//! async fn list_bookings(user: SessionUser) -> Result<Json<Vec<BookingDetails>>, AppError> {
//!     // user.user_id comes from a live session
//! }
//!
//! // Require the organizer role
//! async fn create_event(organizer: RequireOrganizer) -> Result<Json<Event>, AppError> {
//!     // organizer.user_id is guaranteed to be an organizer
//! }
//! ```

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use seatbook_core::types::{Role, UserId};
use seatbook_web::{AppError, BearerToken};

use crate::server::state::AppState;

/// Authenticated session user.
///
/// Extracts the bearer token and resolves it to a live session. Use this as
/// a handler parameter to require authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUser {
    /// The authenticated user ID
    pub user_id: UserId,
    /// The user's role
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = BearerToken::from_request_parts(parts, state).await?;

        let identity = state
            .users
            .resolve_session(token.0)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired session"))?;

        Ok(Self {
            user_id: identity.user_id,
            role: identity.role,
        })
    }
}

/// Require the organizer role.
///
/// Returns 403 Forbidden if the authenticated user is an explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequireOrganizer {
    /// The authenticated organizer
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<AppState> for RequireOrganizer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = SessionUser::from_request_parts(parts, state).await?;
        if user.role != Role::Organizer {
            return Err(AppError::forbidden("Only organizers can perform this action"));
        }
        Ok(Self {
            user_id: user.user_id,
        })
    }
}
