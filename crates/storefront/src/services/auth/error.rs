//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::email::MailError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required registration field is missing or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Terms of service were not accepted.
    #[error("terms must be accepted")]
    TermsNotAccepted,

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] ivma_core::EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Email already has an account (case-insensitive).
    #[error("email already registered")]
    EmailAlreadyRegistered,

    /// Invalid credentials. Deliberately covers both unknown email and
    /// wrong password so responses never reveal which one it was.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Account temporarily locked after repeated failed logins.
    #[error("account locked")]
    AccountLocked,

    /// Password was correct but the email is not verified yet.
    #[error("email not verified")]
    EmailNotVerified,

    /// No matching unexpired verification code.
    #[error("invalid or expired verification code")]
    InvalidVerificationCode,

    /// Resend target does not exist or is already verified. One variant for
    /// both cases so the response cannot be used for account enumeration.
    #[error("account not found or already verified")]
    VerificationUnavailable,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Email delivery error.
    #[error("email error: {0}")]
    Mail(#[from] MailError),
}
