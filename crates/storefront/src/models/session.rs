//! Session domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ivma_core::{CustomerId, Email};

/// A server-side session record backing the `session` cookie.
///
/// The token is the whole secret; the row exists only while the session is
/// valid. A deleted or expired token must never resolve to a customer.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque token (base64url, 256 bits of OS randomness).
    pub token: String,
    /// Customer this session belongs to.
    pub customer_id: CustomerId,
    /// Hard expiry; activity does not extend it.
    pub expires_at: DateTime<Utc>,
    /// Client IP recorded at issue time.
    pub ip: Option<String>,
    /// Client user agent recorded at issue time.
    pub user_agent: Option<String>,
    /// Last time the session resolved a request (best-effort).
    pub last_seen_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Minimal authenticated identity attached to a request.
///
/// What `resolve_session` hands to route handlers; everything else is
/// fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Customer's database ID.
    pub id: CustomerId,
    /// Customer's email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
}
