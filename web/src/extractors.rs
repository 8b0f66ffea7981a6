//! Custom Axum extractors.
//!
//! - [`CorrelationId`]: the request's correlation ID
//! - [`BearerToken`]: the session token from `Authorization: Bearer <uuid>`
//! - [`AppJson`], [`AppPath`], [`AppQuery`]: `Json`/`Path`/`Query` whose
//!   rejections render as [`AppError`] bodies
//!
//! Resolving a token to a user needs the application's directory, so that
//! step lives with the application state; this module only parses headers.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts},
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::correlation_id_from_headers;

/// Correlation ID for request tracing.
///
/// Uses the ID assigned by the correlation layer when installed, then the
/// `X-Correlation-ID` header, and otherwise generates a new UUID v4.
///
/// # Example
///
/// ```ignore
/// async fn handler(correlation_id: CorrelationId) -> String {
///     format!("Request ID: {}", correlation_id.0)
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(id) = parts.extensions.get::<Self>() {
            return Ok(*id);
        }
        Ok(Self(
            correlation_id_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

/// Opaque session token from the `Authorization` header.
///
/// Rejects with 401 when the header is missing, is not a `Bearer` credential,
/// or does not hold a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerToken(pub Uuid);

impl BearerToken {
    /// Parses an `Authorization` header value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Uuid::parse_str(token.trim()).ok().map(Self)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization token"))?;

        Self::parse(value).ok_or_else(|| AppError::unauthorized("Invalid authorization token"))
    }
}

/// JSON body extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query-string extractor that rejects with a 400 [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_correlation_id_from_header() {
        let uuid = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Correlation-ID", uuid.to_string())
            .body(())
            .expect("Valid request");

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, uuid);
    }

    #[tokio::test]
    async fn test_correlation_id_prefers_extension() {
        let assigned = Uuid::new_v4();
        let mut req = Request::builder()
            .header("X-Correlation-ID", Uuid::new_v4().to_string())
            .body(())
            .expect("Valid request");
        req.extensions_mut().insert(CorrelationId(assigned));

        let (mut parts, ()) = req.into_parts();
        let correlation_id = CorrelationId::from_request_parts(&mut parts, &())
            .await
            .expect("Should extract");

        assert_eq!(correlation_id.0, assigned);
    }

    #[test]
    fn test_bearer_token_parse() {
        let token = Uuid::new_v4();
        assert_eq!(BearerToken::parse(&format!("Bearer {token}")), Some(BearerToken(token)));
        assert_eq!(BearerToken::parse(&format!("bearer  {token}")), Some(BearerToken(token)));
        assert_eq!(BearerToken::parse(&format!("Basic {token}")), None);
        assert_eq!(BearerToken::parse("Bearer not-a-uuid"), None);
        assert_eq!(BearerToken::parse("Bearer"), None);
    }

    #[tokio::test]
    async fn test_missing_bearer_token_is_unauthorized() {
        let (mut parts, ()) = Request::builder()
            .body(())
            .expect("Valid request")
            .into_parts();
        let rejection = BearerToken::from_request_parts(&mut parts, &())
            .await
            .expect_err("Should reject");

        assert_eq!(rejection.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_path_is_validation_error() {
        use axum::{Router, body::Body, routing::get};
        use tower::ServiceExt;

        let app = Router::new().route(
            "/events/:id",
            get(|AppPath(id): AppPath<Uuid>| async move { id.to_string() }),
        );
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/events/not-a-uuid")
                    .body(Body::empty())
                    .expect("Valid request"),
            )
            .await
            .expect("Infallible");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
