//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::models::Store;
use crate::services::email::{EmailService, MailError};

/// Store-profile cache capacity.
const STORE_CACHE_CAPACITY: u64 = 1_000;

/// Store-profile cache TTL. Profiles are read-mostly; a minute of staleness
/// is acceptable.
const STORE_CACHE_TTL_SECS: u64 = 60;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    email: EmailService,
    store_cache: Cache<String, Store>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay configuration is invalid.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, MailError> {
        let email = EmailService::from_config(config.smtp.as_ref())?;

        let store_cache = Cache::builder()
            .max_capacity(STORE_CACHE_CAPACITY)
            .time_to_live(Duration::from_secs(STORE_CACHE_TTL_SECS))
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                store_cache,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the store-profile cache.
    #[must_use]
    pub fn store_cache(&self) -> &Cache<String, Store> {
        &self.inner.store_cache
    }
}
