//! Authentication route handlers.
//!
//! Registration, email verification, login, logout, and the `/auth/me`
//! identity endpoint. Session issuance always goes through the same
//! cookie helpers so attributes never drift between login and verify.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::middleware::{
    RequireAuth, build_clear_cookie, build_session_cookie, client_ip, session_token_from_headers,
    user_agent,
};
use crate::services::auth::{AuthService, RegisterInput};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

/// Email verification request body.
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

/// Resend-verification request body.
#[derive(Debug, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a new account and send the verification code.
///
/// POST /auth/register
///
/// Returns 201 with the email only; no session is issued until the address
/// is verified.
///
/// # Errors
///
/// 400 on validation failures, 409 when the email is already registered.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.email());

    let customer = auth
        .register(RegisterInput {
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
            agree_to_terms: body.agree_to_terms,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Account created. Check your email for the verification code.",
            "email": customer.email,
        })),
    ))
}

/// Verify an email address and start the first session.
///
/// POST /auth/verify-email
///
/// # Errors
///
/// 400 when no matching unexpired code exists.
pub async fn verify_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.email());

    let customer = auth.verify_email(&body.email, &body.code).await?;
    let session = auth
        .issue_session(
            customer.id,
            client_ip(&headers).as_deref(),
            user_agent(&headers).as_deref(),
        )
        .await?;

    let cookie = build_session_cookie(&session.token, state.config().is_production());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "success": true,
            "message": "Email verified.",
            "customer": customer,
        })),
    ))
}

/// Re-issue a verification code for an unverified account.
///
/// POST /auth/resend-verification
///
/// # Errors
///
/// 404 (generic) when the account does not exist or is already verified;
/// the two cases are indistinguishable by design.
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(body): Json<ResendVerificationRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.email());

    auth.resend_verification(&body.email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "A new verification code is on its way.",
    })))
}

/// Password login.
///
/// POST /auth/login
///
/// # Errors
///
/// 401 with one generic message for unknown email or wrong password; 403
/// for locked accounts and unverified emails (distinct machine-readable
/// codes).
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.email());

    let customer = auth.login(&body.email, &body.password).await?;
    let session = auth
        .issue_session(
            customer.id,
            client_ip(&headers).as_deref(),
            user_agent(&headers).as_deref(),
        )
        .await?;

    let cookie = build_session_cookie(&session.token, state.config().is_production());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "success": true,
            "message": "Logged in.",
            "customer": customer,
        })),
    ))
}

/// Delete the server-side session and clear the cookie.
///
/// POST /auth/logout
///
/// Succeeds whether or not a session existed; the expired `Set-Cookie`
/// goes out regardless.
///
/// # Errors
///
/// 500 only if the session delete itself fails.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    if let Some(token) = session_token_from_headers(&headers) {
        let auth = AuthService::new(state.pool(), state.email());
        auth.logout(&token).await?;
    }

    let cookie = build_clear_cookie(state.config().is_production());

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({
            "success": true,
            "message": "Logged out.",
        })),
    ))
}

/// Current authenticated customer.
///
/// GET /auth/me
///
/// # Errors
///
/// 401 without a valid session.
pub async fn me(RequireAuth(customer): RequireAuth) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "customer": customer,
    }))
}
