//! Catalog repository: stores and products.
//!
//! Read-mostly reference data consumed by cart, wishlist, and order
//! operations. Writes happen elsewhere in the platform; this service only
//! reads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ivma_core::{ProductId, StoreId};

use super::RepositoryError;
use crate::models::{Product, Store};

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    name: String,
    slug: String,
    description: Option<String>,
    contact_email: Option<String>,
    logo_url: Option<String>,
    website_url: Option<String>,
    instagram_handle: Option<String>,
    owner_user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for Store {
    fn from(r: StoreRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            description: r.description,
            contact_email: r.contact_email,
            logo_url: r.logo_url,
            website_url: r.website_url,
            instagram_handle: r.instagram_handle,
            owner_user_id: r.owner_user_id,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    store_id: StoreId,
    name: String,
    sku: String,
    unit_price: Decimal,
    stock_quantity: i32,
    is_active: bool,
    is_web_visible: bool,
    image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            store_id: r.store_id,
            name: r.name,
            sku: r.sku,
            unit_price: r.unit_price,
            stock_quantity: r.stock_quantity,
            is_active: r.is_active,
            is_web_visible: r.is_web_visible,
            image_url: r.image_url,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, store_id, name, sku, unit_price, stock_quantity, is_active, is_web_visible, image_url";

const STORE_COLUMNS: &str = "id, name, slug, description, contact_email, logo_url, \
     website_url, instagram_handle, owner_user_id, created_at";

/// Repository for catalog lookups.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Get several products in one round trip. Missing IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_products(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw_ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = ANY($1)"
        ))
        .bind(&raw_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_store(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM storefront.store WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Store::from))
    }

    /// Get a store by its public slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_store_by_slug(&self, slug: &str) -> Result<Option<Store>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM storefront.store WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Store::from))
    }
}
