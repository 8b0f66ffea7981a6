//! Account endpoints.
//!
//! - POST /api/auth/signup - Register and receive a session token
//! - POST /api/auth/login - Exchange email or mobile plus password for a new session
//! - GET /api/auth/profile - The caller's profile
//! - PUT /api/auth/profile - Update name, email, mobile or password

use axum::{Json, extract::State, http::StatusCode};
use seatbook_core::directory::{Credentials, LoginId, NewUser, ProfileUpdate};
use seatbook_core::password::Password;
use seatbook_core::types::{Role, User};
use seatbook_web::{AppError, AppJson};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::SessionUser;
use crate::server::state::AppState;

/// Signup request.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    /// Display name
    pub name: String,
    /// 10-digit mobile number
    pub mobile: String,
    /// `organizer` or `explorer`
    pub role: String,
    /// Optional email
    pub email: Option<String>,
    /// Password, at least 8 characters
    pub password: Password,
}

/// Login request. Exactly one of `email` and `mobile` identifies the user.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Registered email
    pub email: Option<String>,
    /// Registered mobile number
    pub mobile: Option<String>,
    /// Password
    pub password: Password,
}

impl LoginRequest {
    fn into_credentials(self) -> Result<Credentials, AppError> {
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        let login = match (non_blank(self.email), non_blank(self.mobile)) {
            (Some(email), None) => LoginId::Email(email),
            (None, Some(mobile)) => LoginId::Mobile(mobile),
            _ => {
                return Err(AppError::validation(
                    "Provide either email or mobile, and a password",
                ));
            }
        };
        Ok(Credentials {
            login,
            password: self.password,
        })
    }
}

/// A user and a bearer token for them.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// Bearer session token
    pub token: Uuid,
    /// The authenticated user
    pub user: User,
}

/// Register a user and open their first session.
///
/// # Status Codes
///
/// - 201: registered
/// - 400: missing fields, malformed mobile/email, short password, unknown role
/// - 409: mobile or email already registered
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/auth/signup \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Asha", "mobile": "9876543210", "role": "explorer", "password": "s3cret-pass"}'
/// # {"token":"...","user":{...}}
/// ```
pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let role = Role::parse(request.role.trim())?;
    let email = request.email.filter(|e| !e.trim().is_empty());

    let user = state
        .users
        .register(NewUser {
            name: request.name,
            mobile: request.mobile,
            role,
            email,
            password: request.password,
        })
        .await?;
    let session = state.users.create_session(user.id, state.session_ttl).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token: session.token,
            user,
        }),
    ))
}

/// Log in with email or mobile plus password.
///
/// # Status Codes
///
/// - 200: new session issued
/// - 400: neither or both of `email`/`mobile` given
/// - 401: unknown user or wrong password
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3000/api/auth/login \
///   -H "Content-Type: application/json" \
///   -d '{"email": "asha@example.com", "password": "s3cret-pass"}'
/// ```
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state.users.authenticate(request.into_credentials()?).await?;
    let session = state.users.create_session(user.id, state.session_ttl).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(SessionResponse {
        token: session.token,
        user,
    }))
}

/// The caller's profile.
pub async fn profile(
    user: SessionUser,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.get_user(user.user_id).await?))
}

/// Update the caller's profile. Absent fields keep their values.
pub async fn update_profile(
    user: SessionUser,
    State(state): State<AppState>,
    AppJson(update): AppJson<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.users.update_profile(user.user_id, update).await?))
}
