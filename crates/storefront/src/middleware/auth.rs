//! Authentication extractors.
//!
//! Route handlers declare their authentication requirement through these
//! extractors; the session cookie is the sole signal either one consumes.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::session::session_token_from_headers;
use crate::models::CurrentCustomer;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Extractor that requires an authenticated customer.
///
/// Rejects with 401 when the `session` cookie is missing, expired, or
/// unknown.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentCustomer);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing session cookie".to_owned()))?;

        let auth = AuthService::new(state.pool(), state.email());
        let customer = auth
            .resolve_session(&token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid or expired session".to_owned()))?;

        Ok(Self(customer))
    }
}

/// Extractor that optionally resolves the current customer.
///
/// Unlike `RequireAuth`, this never rejects: a missing or invalid session
/// (or a resolution failure) yields `None`.
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let customer = match session_token_from_headers(&parts.headers) {
            Some(token) => {
                let auth = AuthService::new(state.pool(), state.email());
                auth.resolve_session(&token).await.ok().flatten()
            }
            None => None,
        };

        Ok(Self(customer))
    }
}
