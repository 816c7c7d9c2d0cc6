//! Session cookie handling.
//!
//! The `session` cookie is the sole authentication signal: an HTTP-only,
//! `SameSite=Lax` cookie holding the opaque server-side token. `Secure` is
//! added whenever the storefront is served over HTTPS.

use axum::http::{HeaderMap, header};

use crate::services::auth::SESSION_TTL_DAYS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Cookie lifetime, matched to the server-side session expiry.
const SESSION_MAX_AGE_SECONDS: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;

/// Build the `Set-Cookie` value that installs a session token.
#[must_use]
pub fn build_session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; Max-Age={SESSION_MAX_AGE_SECONDS}; \
         HttpOnly; SameSite=Lax"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Build the expired `Set-Cookie` value that clears the session cookie.
///
/// Sent on every logout, whether or not a server-side session existed.
#[must_use]
pub fn build_clear_cookie(secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session token from the request's `Cookie` header.
#[must_use]
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE_NAME).then(|| value.to_owned())
    })
}

/// Extract the client IP from proxy headers, as a string for session
/// metadata. Uses the same header chain as the rate limiter.
#[must_use]
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    super::rate_limit::client_ip_from_headers(headers).map(|ip| ip.to_string())
}

/// Extract the client user agent.
#[must_use]
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = build_session_cookie("tok123", false);
        assert!(cookie.starts_with("session=tok123; "));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=604800"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let cookie = build_session_cookie("tok123", true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = build_clear_cookie(false);
        assert!(cookie.starts_with("session=; "));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_token_extraction_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; lang=en"),
        );
        assert_eq!(session_token_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_token_extraction_missing_cookie() {
        let mut headers = HeaderMap::new();
        assert!(session_token_from_headers(&headers).is_none());

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert!(session_token_from_headers(&headers).is_none());
    }
}
