//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Rate limiting (governor; strict on `/auth`)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireAuth`]/[`OptionalAuth`] extractors, which resolve the `session`
//! cookie against the session store.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use session::{
    SESSION_COOKIE_NAME, build_clear_cookie, build_session_cookie, client_ip,
    session_token_from_headers, user_agent,
};
