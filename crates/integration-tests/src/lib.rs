//! Integration tests for IVMA Store.
//!
//! # Running Tests
//!
//! The tests drive a running storefront over HTTP and skip themselves when
//! the target is not configured:
//!
//! ```bash
//! # Start the database, run migrations, seed, and start the storefront
//! cargo run -p ivma-cli -- migrate
//! cargo run -p ivma-cli -- seed
//! cargo run -p ivma-storefront &
//!
//! # Point the tests at it
//! STOREFRONT_BASE_URL=http://localhost:3000 \
//! STOREFRONT_TEST_DATABASE_URL=postgres://localhost/ivma_storefront \
//!     cargo test -p ivma-integration-tests
//! ```
//!
//! `STOREFRONT_TEST_DATABASE_URL` is only needed by flows that must read
//! the verification code out of the database (it is otherwise delivered by
//! email, which the tests cannot see).

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;
use uuid::Uuid;

/// Test harness: HTTP client with a cookie store plus the target base URL.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build the context from `STOREFRONT_BASE_URL`, or `None` when the
    /// environment is not configured (the test should skip).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("STOREFRONT_BASE_URL").ok()?;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Some(Self { client, base_url })
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Read a pending verification code straight from the database.
    ///
    /// Requires `STOREFRONT_TEST_DATABASE_URL`; returns `None` when it is
    /// not set so callers can skip.
    pub async fn verification_code_for(&self, email: &str) -> Option<String> {
        let database_url = std::env::var("STOREFRONT_TEST_DATABASE_URL").ok()?;

        let pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        let row: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT verification_code FROM storefront.customer WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&pool)
        .await
        .expect("Failed to query verification code");

        row.and_then(|(code,)| code)
    }
}

/// A unique registration email per test run.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@test.ivma.dev", Uuid::new_v4().simple())
}

/// The registration body every flow starts from.
#[must_use]
pub fn register_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": "Abcdef1!pass",
        "firstName": "Integration",
        "lastName": "Test",
        "agreeToTerms": true,
    })
}
