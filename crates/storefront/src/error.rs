//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that translates every typed service
//! error into the response taxonomy: status code, generic-or-specific
//! message, and a machine-readable `code` where clients need to branch.
//! All route handlers return `Result<T, AppError>`. Server-side failures
//! are captured to Sentry before responding; internal detail never reaches
//! the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::cart::CartError;
use crate::services::orders::OrderError;
use crate::services::wishlist::WishlistError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Wishlist operation failed.
    #[error("Wishlist error: {0}")]
    Wishlist(#[from] WishlistError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// What a given error should look like on the wire.
struct Rendered {
    status: StatusCode,
    message: String,
    /// Machine-readable reason for clients that branch on it.
    code: Option<&'static str>,
    /// For insufficient-stock errors: what IS available.
    available: Option<i32>,
}

impl Rendered {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
            available: None,
        }
    }

    fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    const INTERNAL: &'static str = "Internal server error";

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, Self::INTERNAL)
    }
}

impl AppError {
    fn render(&self) -> Rendered {
        match self {
            Self::Auth(err) => match err {
                AuthError::MissingField(_)
                | AuthError::TermsNotAccepted
                | AuthError::InvalidEmail(_)
                | AuthError::WeakPassword(_) => {
                    Rendered::new(StatusCode::BAD_REQUEST, err.to_string())
                }
                AuthError::EmailAlreadyRegistered => Rendered::new(
                    StatusCode::CONFLICT,
                    "An account with this email already exists",
                )
                .with_code("EMAIL_ALREADY_REGISTERED"),
                AuthError::InvalidCredentials => {
                    Rendered::new(StatusCode::UNAUTHORIZED, "Invalid email or password")
                }
                AuthError::AccountLocked => Rendered::new(
                    StatusCode::FORBIDDEN,
                    "Account temporarily locked after too many failed attempts",
                )
                .with_code("ACCOUNT_LOCKED"),
                AuthError::EmailNotVerified => Rendered::new(
                    StatusCode::FORBIDDEN,
                    "Email address has not been verified",
                )
                .with_code("EMAIL_NOT_VERIFIED"),
                AuthError::InvalidVerificationCode => Rendered::new(
                    StatusCode::BAD_REQUEST,
                    "Invalid or expired verification code",
                )
                .with_code("INVALID_VERIFICATION_CODE"),
                AuthError::VerificationUnavailable => Rendered::new(
                    StatusCode::NOT_FOUND,
                    "Account not found or already verified",
                ),
                AuthError::PasswordHash | AuthError::Repository(_) | AuthError::Mail(_) => {
                    Rendered::internal()
                }
            },
            Self::Cart(err) => match err {
                CartError::ProductNotFound => {
                    Rendered::new(StatusCode::NOT_FOUND, "Product not found")
                }
                CartError::ProductNotAvailable => {
                    Rendered::new(StatusCode::BAD_REQUEST, "Product is not available")
                        .with_code("PRODUCT_NOT_AVAILABLE")
                }
                CartError::InsufficientStock { available } => {
                    let mut rendered = Rendered::new(
                        StatusCode::BAD_REQUEST,
                        format!("Insufficient stock: {available} available"),
                    )
                    .with_code("INSUFFICIENT_STOCK");
                    rendered.available = Some(*available);
                    rendered
                }
                CartError::InvalidQuantity => {
                    Rendered::new(StatusCode::BAD_REQUEST, "Quantity must not be negative")
                }
                CartError::ItemNotFound => {
                    Rendered::new(StatusCode::NOT_FOUND, "Cart item not found")
                }
                CartError::Repository(_) => Rendered::internal(),
            },
            Self::Wishlist(err) => match err {
                WishlistError::ProductNotFound => {
                    Rendered::new(StatusCode::NOT_FOUND, "Product not found")
                }
                WishlistError::ItemNotFound => {
                    Rendered::new(StatusCode::NOT_FOUND, "Wishlist item not found")
                }
                WishlistError::Repository(_) => Rendered::internal(),
            },
            Self::Order(err) => match err {
                OrderError::NotFound => Rendered::new(StatusCode::NOT_FOUND, "Order not found"),
                OrderError::InvalidTransition { .. } => {
                    Rendered::new(StatusCode::CONFLICT, err.to_string())
                        .with_code("INVALID_TRANSITION")
                }
                OrderError::ActorNotAllowed { .. } => Rendered::new(
                    StatusCode::FORBIDDEN,
                    "This role may not perform that status change",
                ),
                OrderError::Repository(_) => Rendered::internal(),
            },
            Self::Database(_) | Self::Internal(_) => Rendered::internal(),
            Self::NotFound(_) => Rendered::new(StatusCode::NOT_FOUND, self.to_string()),
            Self::Unauthorized(_) => {
                Rendered::new(StatusCode::UNAUTHORIZED, "Authentication required")
            }
            Self::BadRequest(_) => Rendered::new(StatusCode::BAD_REQUEST, self.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rendered = self.render();

        // Capture server errors to Sentry
        if rendered.status == StatusCode::INTERNAL_SERVER_ERROR {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut body = serde_json::json!({
            "success": false,
            "message": rendered.message,
        });
        if let Some(code) = rendered.code {
            body["code"] = code.into();
        }
        if let Some(available) = rendered.available {
            body["available"] = available.into();
        }

        (rendered.status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use ivma_core::{OrderStatus, StatusActor};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_auth_error_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailAlreadyRegistered)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::AccountLocked)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailNotVerified)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::VerificationUnavailable)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidVerificationCode)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_cart_error_status_codes() {
        assert_eq!(
            get_status(AppError::Cart(CartError::ProductNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::InsufficientStock { available: 2 })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::InvalidQuantity)),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_order_error_status_codes() {
        assert_eq!(
            get_status(AppError::Order(OrderError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::InvalidTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::ActorNotAllowed {
                actor: StatusActor::Customer,
                to: OrderStatus::Shipped,
            })),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_insufficient_stock_body_carries_available() {
        let response =
            AppError::Cart(CartError::InsufficientStock { available: 3 }).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("valid JSON");

        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");
        assert_eq!(body["available"], 3);
    }

    #[tokio::test]
    async fn test_internal_errors_hide_detail() {
        let response =
            AppError::Internal("connection pool exhausted on shard 7".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .expect("body reads");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("valid JSON");
        assert_eq!(body["message"], "Internal server error");
    }
}
