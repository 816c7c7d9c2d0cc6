//! Customer repository for database operations.
//!
//! Holds account records: identity, password hash, verification state, and
//! lockout counters. The password hash never leaves this module except
//! through [`AuthRecord`] during login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ivma_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str =
    "id, email, first_name, last_name, phone, is_verified, last_login_at, created_at";

/// Customer row as stored, without credential fields.
#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    email: Email,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    is_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(r: CustomerRow) -> Self {
        Self {
            id: r.id,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            phone: r.phone,
            is_verified: r.is_verified,
            last_login_at: r.last_login_at,
            created_at: r.created_at,
        }
    }
}

/// Customer plus the credential/lockout fields needed to decide a login.
#[derive(sqlx::FromRow)]
pub struct AuthRecord {
    pub id: CustomerId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub is_verified: bool,
    pub password_hash: String,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer by their (normalized) email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM storefront.customer WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Get a customer by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM storefront.customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Create a new unverified customer with a pending verification code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        email: &Email,
        first_name: &str,
        last_name: &str,
        phone: Option<&str>,
        password_hash: &str,
        verification_code: &str,
        verification_expires_at: DateTime<Utc>,
    ) -> Result<Customer, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "INSERT INTO storefront.customer \
               (email, first_name, last_name, phone, password_hash, \
                verification_code, verification_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(password_hash)
        .bind(verification_code)
        .bind(verification_expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email already registered"))?;

        Ok(row.into())
    }

    /// Get the credential/lockout record used to decide a login attempt.
    ///
    /// Returns `None` if no account exists for the email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_auth_record(
        &self,
        email: &Email,
    ) -> Result<Option<AuthRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthRecord>(
            "SELECT id, email, first_name, last_name, is_verified, password_hash, \
                    failed_login_attempts, locked_until \
             FROM storefront.customer WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Store a fresh verification code for an unverified account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist or
    /// is already verified.
    pub async fn set_verification_code(
        &self,
        customer_id: CustomerId,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.customer \
             SET verification_code = $2, verification_expires_at = $3, updated_at = NOW() \
             WHERE id = $1 AND is_verified = FALSE",
        )
        .bind(customer_id)
        .bind(code)
        .bind(expires_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Atomically consume a verification code: marks the account verified
    /// and clears the code, but only if the code matches and is unexpired.
    ///
    /// Returns `None` when no matching unexpired code exists (wrong code,
    /// expired code, unknown email, or already-verified account).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn verify_with_code(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "UPDATE storefront.customer \
             SET is_verified = TRUE, verification_code = NULL, \
                 verification_expires_at = NULL, updated_at = NOW() \
             WHERE email = $1 AND is_verified = FALSE \
               AND verification_code = $2 AND verification_expires_at > $3 \
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(email)
        .bind(code)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Record a failed login attempt, locking the account once the
    /// consecutive-failure threshold is reached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_login_failure(
        &self,
        customer_id: CustomerId,
        max_attempts: i32,
        lock_minutes: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE storefront.customer \
             SET failed_login_attempts = failed_login_attempts + 1, \
                 locked_until = CASE \
                     WHEN failed_login_attempts + 1 >= $2 \
                     THEN NOW() + make_interval(mins => $3) \
                     ELSE locked_until \
                 END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(customer_id)
        .bind(max_attempts)
        .bind(lock_minutes)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Record a successful login: resets the lockout counter and stamps
    /// `last_login_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_login_success(
        &self,
        customer_id: CustomerId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE storefront.customer \
             SET failed_login_attempts = 0, locked_until = NULL, \
                 last_login_at = NOW(), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(customer_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
