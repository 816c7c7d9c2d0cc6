//! Catalog service.
//!
//! Public product and store lookups. Store profiles are read-mostly
//! reference data, so they sit behind a small TTL cache; products carry
//! live stock numbers and are always read through.

use moka::future::Cache;
use sqlx::PgPool;

use ivma_core::ProductId;

use crate::db::catalog::CatalogRepository;
use crate::db::RepositoryError;
use crate::models::{Product, Store};

/// Catalog service.
pub struct CatalogService<'a> {
    catalog: CatalogRepository<'a>,
    store_cache: &'a Cache<String, Store>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, store_cache: &'a Cache<String, Store>) -> Self {
        Self {
            catalog: CatalogRepository::new(pool),
            store_cache,
        }
    }

    /// Get a product by ID. Not cached: stock must be current.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.catalog.get_product(id).await
    }

    /// Get a store profile by slug, served from the TTL cache when warm.
    ///
    /// Negative results are not cached, so a newly created store shows up
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_store_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        if let Some(store) = self.store_cache.get(slug).await {
            return Ok(Some(store));
        }

        let store = self.catalog.get_store_by_slug(slug).await?;

        if let Some(ref found) = store {
            self.store_cache
                .insert(slug.to_owned(), found.clone())
                .await;
        }

        Ok(store)
    }
}
