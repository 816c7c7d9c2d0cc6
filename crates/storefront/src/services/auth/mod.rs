//! Authentication service.
//!
//! Registration with email verification codes, password login with
//! lockout counters, and the opaque-token session lifecycle behind the
//! `session` cookie.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use ivma_core::{CustomerId, Email};

use crate::db::customers::CustomerRepository;
use crate::db::sessions::SessionRepository;
use crate::db::RepositoryError;
use crate::models::{CurrentCustomer, Customer, Session};
use crate::services::email::{EmailService, generate_verification_code};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Verification codes are valid for this many minutes.
const VERIFICATION_CODE_TTL_MINUTES: i64 = 10;

/// Sessions expire this many days after issuance; activity does not
/// extend the deadline.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Consecutive failed logins before the account locks.
const MAX_FAILED_LOGINS: i32 = 5;

/// How long a lockout lasts.
const LOCKOUT_MINUTES: i32 = 15;

/// Raw entropy per session token (256 bits).
const SESSION_TOKEN_BYTES: usize = 32;

/// Fields submitted at registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub agree_to_terms: bool,
}

/// Authentication service.
///
/// Handles customer registration, email verification, login, and the
/// server-side session lifecycle.
pub struct AuthService<'a> {
    customers: CustomerRepository<'a>,
    sessions: SessionRepository<'a>,
    email: &'a EmailService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, email: &'a EmailService) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
            sessions: SessionRepository::new(pool),
            email,
        }
    }

    // =========================================================================
    // Registration & Verification
    // =========================================================================

    /// Register a new customer account.
    ///
    /// Stores only the password hash and a pending 6-digit verification
    /// code, then triggers code delivery. No session is issued yet; the
    /// caller gets back the created (unverified) account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField`/`TermsNotAccepted`/`InvalidEmail`/
    /// `WeakPassword` on validation failures and
    /// `AuthError::EmailAlreadyRegistered` on a duplicate email.
    pub async fn register(&self, input: RegisterInput) -> Result<Customer, AuthError> {
        require_field("email", &input.email)?;
        require_field("password", &input.password)?;
        require_field("firstName", &input.first_name)?;
        require_field("lastName", &input.last_name)?;

        if !input.agree_to_terms {
            return Err(AuthError::TermsNotAccepted);
        }

        let email = Email::parse(&input.email)?;
        validate_password(&input.password)?;
        let password_hash = hash_password(&input.password)?;

        let code = generate_verification_code();
        let code_expires_at = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);

        let customer = self
            .customers
            .create(
                &email,
                input.first_name.trim(),
                input.last_name.trim(),
                input.phone.as_deref(),
                &password_hash,
                &code,
                code_expires_at,
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailAlreadyRegistered,
                other => AuthError::Repository(other),
            })?;

        // Delivery is best effort: the account exists either way, and the
        // resend endpoint covers a lost message.
        if let Err(e) = self
            .email
            .send_verification_code(customer.email.as_str(), &code)
            .await
        {
            tracing::warn!(customer_id = %customer.id, error = %e,
                "Failed to deliver verification code");
        }

        tracing::info!(customer_id = %customer.id, "Customer registered");

        Ok(customer)
    }

    /// Verify an email address with the 6-digit code.
    ///
    /// Succeeds only while a matching unexpired code exists; one tick past
    /// expiry fails. On success the code is consumed and the account marked
    /// verified.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidVerificationCode` for a wrong, expired,
    /// or already-consumed code.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<Customer, AuthError> {
        let email = Email::parse(email)?;

        let customer = self
            .customers
            .verify_with_code(&email, code, Utc::now())
            .await?
            .ok_or(AuthError::InvalidVerificationCode)?;

        if let Err(e) = self
            .email
            .send_welcome(customer.email.as_str(), &customer.first_name)
            .await
        {
            tracing::warn!(customer_id = %customer.id, error = %e,
                "Failed to deliver welcome email");
        }

        tracing::info!(customer_id = %customer.id, "Email verified");

        Ok(customer)
    }

    /// Re-issue a fresh verification code for an unverified account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::VerificationUnavailable` when the account does
    /// not exist OR is already verified; the two cases are indistinguishable
    /// to the caller by design.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        let customer = self
            .customers
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::VerificationUnavailable)?;

        if customer.is_verified {
            return Err(AuthError::VerificationUnavailable);
        }

        let code = generate_verification_code();
        let code_expires_at = Utc::now() + Duration::minutes(VERIFICATION_CODE_TTL_MINUTES);

        self.customers
            .set_verification_code(customer.id, &code, code_expires_at)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => AuthError::VerificationUnavailable,
                other => AuthError::Repository(other),
            })?;

        if let Err(e) = self
            .email
            .send_verification_code(customer.email.as_str(), &code)
            .await
        {
            tracing::warn!(customer_id = %customer.id, error = %e,
                "Failed to deliver verification code");
        }

        tracing::info!(customer_id = %customer.id, "Verification code re-issued");

        Ok(())
    }

    // =========================================================================
    // Login & Sessions
    // =========================================================================

    /// Login with email and password.
    ///
    /// The failure order is deliberate: lockout is checked first so locked
    /// accounts cannot be probed; the password is verified BEFORE the
    /// verified-email check, so the unverified response never confirms a
    /// password guess; and unknown email / wrong password are the same
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials`, `AuthError::AccountLocked`,
    /// or `AuthError::EmailNotVerified`.
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer, AuthError> {
        // A malformed email cannot belong to an account; same generic error.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let record = self
            .customers
            .get_auth_record(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(locked_until) = record.locked_until
            && locked_until > Utc::now()
        {
            tracing::warn!(customer_id = %record.id, "Login attempt on locked account");
            return Err(AuthError::AccountLocked);
        }

        if verify_password(password, &record.password_hash).is_err() {
            self.customers
                .record_login_failure(record.id, MAX_FAILED_LOGINS, LOCKOUT_MINUTES)
                .await?;
            return Err(AuthError::InvalidCredentials);
        }

        if !record.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        self.customers.record_login_success(record.id).await?;

        let customer = self
            .customers
            .get_by_id(record.id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        tracing::info!(customer_id = %customer.id, "Customer logged in");

        Ok(customer)
    }

    /// Issue a new session for a customer.
    ///
    /// The token carries 256 bits from the OS CSPRNG; the record expires
    /// after [`SESSION_TTL_DAYS`] and remembers the caller's IP and user
    /// agent.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if persistence fails.
    pub async fn issue_session(
        &self,
        customer_id: CustomerId,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Session, AuthError> {
        let token = generate_session_token();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let session = self
            .sessions
            .create(&token, customer_id, expires_at, ip, user_agent)
            .await?;

        tracing::info!(customer_id = %customer_id, "Session issued");

        Ok(session)
    }

    /// Resolve a session token to the customer it belongs to.
    ///
    /// Returns `None` for deleted, expired, or never-issued tokens. The
    /// last-activity refresh is opportunistic: a failure there is logged
    /// and must never fail the resolution.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup itself fails.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<Option<CurrentCustomer>, AuthError> {
        let Some(session) = self.sessions.get_valid(token).await? else {
            return Ok(None);
        };

        if let Err(e) = self.sessions.touch(token).await {
            tracing::warn!(error = %e, "Failed to refresh session activity");
        }

        let Some(customer) = self.customers.get_by_id(session.customer_id).await? else {
            tracing::warn!(customer_id = %session.customer_id,
                "Session resolved to missing customer");
            return Ok(None);
        };

        Ok(Some(CurrentCustomer {
            id: customer.id,
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
        }))
    }

    /// Delete the server-side session record.
    ///
    /// Succeeds whether or not a session existed; the cookie is cleared by
    /// the route layer regardless.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the delete fails.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let deleted = self.sessions.delete(token).await?;
        if deleted {
            tracing::info!("Session terminated");
        }
        Ok(())
    }
}

fn require_field(name: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingField(name));
    }
    Ok(())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate an opaque session token from the OS CSPRNG.
///
/// 32 random bytes, base64url without padding: 43 characters, 256 bits.
fn generate_session_token() -> String {
    use argon2::password_hash::rand_core::RngCore;

    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery").expect("hashes");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn test_password_hashes_are_salted() {
        let a = hash_password("Abcdef1!").expect("hashes");
        let b = hash_password("Abcdef1!").expect("hashes");
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_session_token_format() {
        let token = generate_session_token();
        // 32 bytes -> 43 base64url chars, no padding
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_session_tokens_are_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_require_field_rejects_blank() {
        assert!(require_field("email", "  ").is_err());
        assert!(require_field("email", "a@b.c").is_ok());
    }
}
