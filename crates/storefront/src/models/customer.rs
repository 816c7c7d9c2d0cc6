//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ivma_core::{CustomerId, Email};

/// A storefront customer (domain type).
///
/// Never carries the password hash; the hash only travels through the
/// repository layer during login.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Customer's email address (stored normalized).
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Whether the email has been verified.
    pub is_verified: bool,
    /// When the customer last logged in successfully.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
