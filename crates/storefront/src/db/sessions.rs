//! Session repository.
//!
//! Opaque token storage backing the `session` cookie. Resolution filters on
//! expiry in SQL, so even rows the hourly sweeper has not reached yet never
//! authenticate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ivma_core::CustomerId;

use super::RepositoryError;
use crate::models::Session;

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    customer_id: CustomerId,
    expires_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    last_seen_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(r: SessionRow) -> Self {
        Self {
            token: r.token,
            customer_id: r.customer_id,
            expires_at: r.expires_at,
            ip: r.ip,
            user_agent: r.user_agent,
            last_seen_at: r.last_seen_at,
            created_at: r.created_at,
        }
    }
}

/// Repository for session database operations.
pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a freshly issued session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a token collision (practically
    /// impossible with 256-bit tokens, but the constraint exists).
    pub async fn create(
        &self,
        token: &str,
        customer_id: CustomerId,
        expires_at: DateTime<Utc>,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Session, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "INSERT INTO storefront.session (token, customer_id, expires_at, ip, user_agent) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING token, customer_id, expires_at, ip, user_agent, last_seen_at, created_at",
        )
        .bind(token)
        .bind(customer_id)
        .bind(expires_at)
        .bind(ip)
        .bind(user_agent)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "session token collision"))?;

        Ok(row.into())
    }

    /// Look up an unexpired session by token.
    ///
    /// Deleted, expired, and never-issued tokens all resolve to `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_valid(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token, customer_id, expires_at, ip, user_agent, last_seen_at, created_at \
             FROM storefront.session \
             WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    /// Refresh the session's last-activity timestamp.
    ///
    /// Best-effort from the caller's perspective; callers swallow failures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE storefront.session SET last_seen_at = NOW() WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete a session by token.
    ///
    /// # Returns
    ///
    /// Returns `true` if a session was deleted, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.session WHERE token = $1")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete all expired sessions. Run periodically by the sweeper task.
    ///
    /// # Returns
    ///
    /// The number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.session WHERE expires_at <= NOW()")
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
