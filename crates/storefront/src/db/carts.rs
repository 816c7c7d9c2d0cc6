//! Cart repository.
//!
//! One cart per customer, enforced by a unique constraint; the service
//! layer treats `Conflict` on creation as "someone else won the race" and
//! retries. Line items are keyed by `(cart_id, product_id)` so re-adding a
//! product accumulates quantity on one line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ivma_core::{CartId, CustomerId, ProductId, StoreId};

use super::RepositoryError;
use crate::models::{Cart, CartItem, ProductSnapshot, StoreSnapshot};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    customer_id: CustomerId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: ProductId,
    store_id: StoreId,
    quantity: i32,
    unit_price: Decimal,
    product_name: String,
    product_sku: String,
    product_image_url: Option<String>,
    store_name: String,
    store_slug: String,
    note: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(r: CartItemRow) -> Self {
        Self {
            product_id: r.product_id,
            store_id: r.store_id,
            quantity: r.quantity,
            unit_price: r.unit_price,
            product: ProductSnapshot {
                name: r.product_name,
                sku: r.product_sku,
                image_url: r.product_image_url,
            },
            store: StoreSnapshot {
                name: r.store_name,
                slug: r.store_slug,
            },
            note: r.note,
            added_at: r.added_at,
        }
    }
}

const ITEM_COLUMNS: &str = "product_id, store_id, quantity, unit_price, product_name, \
     product_sku, product_image_url, store_name, store_slug, note, added_at";

/// A line item about to be inserted, snapshot included.
pub struct NewCartItem<'a> {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub product: &'a ProductSnapshot,
    pub store: &'a StoreSnapshot,
    pub note: Option<&'a str>,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer's cart with its line items, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, customer_id, created_at, updated_at \
             FROM storefront.cart WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(cart) = row else {
            return Ok(None);
        };

        let items = self.items(cart.id).await?;

        Ok(Some(Cart {
            id: cart.id,
            customer_id: cart.customer_id,
            items,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }))
    }

    /// Create an empty cart for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer already has a
    /// cart (concurrent first-time creation).
    pub async fn create(&self, customer_id: CustomerId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO storefront.cart (customer_id) VALUES ($1) \
             RETURNING id, customer_id, created_at, updated_at",
        )
        .bind(customer_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "cart already exists for customer"))?;

        Ok(Cart {
            id: row.id,
            customer_id: row.customer_id,
            items: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Get a single line item by product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM storefront.cart_item \
             WHERE cart_id = $1 AND product_id = $2"
        ))
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(CartItem::from))
    }

    /// Insert a line item, or accumulate quantity on the existing line for
    /// the same product. The original snapshot and add-time price win.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_item(
        &self,
        cart_id: CartId,
        item: &NewCartItem<'_>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO storefront.cart_item \
               (cart_id, product_id, store_id, quantity, unit_price, product_name, \
                product_sku, product_image_url, store_name, store_slug, note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(item.product_id)
        .bind(item.store_id)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(&item.product.name)
        .bind(&item.product.sku)
        .bind(&item.product.image_url)
        .bind(&item.store.name)
        .bind(&item.store.slug)
        .bind(item.note)
        .execute(self.pool)
        .await?;

        self.touch(cart_id).await
    }

    /// Set a line's quantity directly.
    ///
    /// # Returns
    ///
    /// Returns `true` if the line existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_item_quantity(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.cart_item SET quantity = $3 \
             WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.touch(cart_id).await?;
        Ok(true)
    }

    /// Remove a line item.
    ///
    /// # Returns
    ///
    /// Returns `true` if the line existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.cart_item WHERE cart_id = $1 AND product_id = $2")
                .bind(cart_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.touch(cart_id).await?;
        Ok(true)
    }

    /// Delete all line items. The cart row itself stays.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        self.touch(cart_id).await
    }

    async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM storefront.cart_item \
             WHERE cart_id = $1 ORDER BY added_at ASC"
        ))
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    async fn touch(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE storefront.cart SET updated_at = NOW() WHERE id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
