//! Wishlist repository.
//!
//! Mirrors the cart layout: one wishlist per customer behind a unique
//! constraint, line items keyed by `(wishlist_id, product_id)`. Re-adding a
//! product updates its metadata rather than duplicating the entry.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ivma_core::{CustomerId, ProductId, StoreId, WishlistId, WishlistPriority};

use super::RepositoryError;
use crate::models::{
    NotificationSettings, ProductSnapshot, StoreSnapshot, Wishlist, WishlistItem,
};

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistId,
    customer_id: CustomerId,
    name: String,
    description: Option<String>,
    is_public: bool,
    share_token: Option<Uuid>,
    owner_first_name: String,
    owner_last_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    product_id: ProductId,
    store_id: StoreId,
    priority: String,
    notes: Option<String>,
    notify_price_drop: bool,
    notify_back_in_stock: bool,
    product_name: String,
    product_sku: String,
    product_image_url: Option<String>,
    store_name: String,
    store_slug: String,
    added_at: DateTime<Utc>,
}

impl TryFrom<WishlistItemRow> for WishlistItem {
    type Error = RepositoryError;

    fn try_from(r: WishlistItemRow) -> Result<Self, Self::Error> {
        let priority = WishlistPriority::from_str(&r.priority).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid wishlist priority: {e}"))
        })?;

        Ok(Self {
            product_id: r.product_id,
            store_id: r.store_id,
            priority,
            notes: r.notes,
            notifications: NotificationSettings {
                notify_price_drop: r.notify_price_drop,
                notify_back_in_stock: r.notify_back_in_stock,
            },
            product: ProductSnapshot {
                name: r.product_name,
                sku: r.product_sku,
                image_url: r.product_image_url,
            },
            store: StoreSnapshot {
                name: r.store_name,
                slug: r.store_slug,
            },
            added_at: r.added_at,
        })
    }
}

const WISHLIST_COLUMNS: &str = "id, customer_id, name, description, is_public, share_token, \
     owner_first_name, owner_last_name, created_at, updated_at";

const ITEM_COLUMNS: &str = "product_id, store_id, priority, notes, notify_price_drop, \
     notify_back_in_stock, product_name, product_sku, product_image_url, \
     store_name, store_slug, added_at";

/// A wishlist entry about to be inserted or refreshed.
pub struct NewWishlistItem<'a> {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub priority: WishlistPriority,
    pub notes: Option<&'a str>,
    pub notifications: NotificationSettings,
    pub product: &'a ProductSnapshot,
    pub store: &'a StoreSnapshot,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a customer's wishlist with items, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` on an invalid stored priority.
    pub async fn get_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Option<Wishlist>, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(&format!(
            "SELECT {WISHLIST_COLUMNS} FROM storefront.wishlist WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(list) = row else {
            return Ok(None);
        };

        let items = self.items(list.id).await?;

        Ok(Some(Wishlist {
            id: list.id,
            customer_id: list.customer_id,
            name: list.name,
            description: list.description,
            is_public: list.is_public,
            share_token: list.share_token,
            owner_first_name: list.owner_first_name,
            owner_last_name: list.owner_last_name,
            items,
            created_at: list.created_at,
            updated_at: list.updated_at,
        }))
    }

    /// Create an empty wishlist seeded with the owner snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the customer already has a
    /// wishlist (concurrent first-time creation).
    pub async fn create(
        &self,
        customer_id: CustomerId,
        name: &str,
        owner_first_name: &str,
        owner_last_name: &str,
    ) -> Result<Wishlist, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(&format!(
            "INSERT INTO storefront.wishlist \
               (customer_id, name, owner_first_name, owner_last_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {WISHLIST_COLUMNS}"
        ))
        .bind(customer_id)
        .bind(name)
        .bind(owner_first_name)
        .bind(owner_last_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "wishlist already exists for customer"))?;

        Ok(Wishlist {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            description: row.description,
            is_public: row.is_public,
            share_token: row.share_token,
            owner_first_name: row.owner_first_name,
            owner_last_name: row.owner_last_name,
            items: Vec::new(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    /// Insert an entry, or refresh the metadata of the existing entry for
    /// the same product. The original snapshot wins; priority, notes, and
    /// notification flags take the new values.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_item(
        &self,
        wishlist_id: WishlistId,
        item: &NewWishlistItem<'_>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO storefront.wishlist_item \
               (wishlist_id, product_id, store_id, priority, notes, notify_price_drop, \
                notify_back_in_stock, product_name, product_sku, product_image_url, \
                store_name, store_slug) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (wishlist_id, product_id) \
             DO UPDATE SET priority = EXCLUDED.priority, notes = EXCLUDED.notes, \
                           notify_price_drop = EXCLUDED.notify_price_drop, \
                           notify_back_in_stock = EXCLUDED.notify_back_in_stock",
        )
        .bind(wishlist_id)
        .bind(item.product_id)
        .bind(item.store_id)
        .bind(item.priority.as_str())
        .bind(item.notes)
        .bind(item.notifications.notify_price_drop)
        .bind(item.notifications.notify_back_in_stock)
        .bind(&item.product.name)
        .bind(&item.product.sku)
        .bind(&item.product.image_url)
        .bind(&item.store.name)
        .bind(&item.store.slug)
        .execute(self.pool)
        .await?;

        self.touch(wishlist_id).await
    }

    /// Update one entry's priority.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_item_priority(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
        priority: WishlistPriority,
    ) -> Result<bool, RepositoryError> {
        self.update_item_column(
            wishlist_id,
            product_id,
            "priority = $3",
            Bind::Str(priority.as_str().to_owned()),
        )
        .await
    }

    /// Update one entry's free-text notes.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_item_notes(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
        notes: Option<&str>,
    ) -> Result<bool, RepositoryError> {
        self.update_item_column(
            wishlist_id,
            product_id,
            "notes = $3",
            Bind::OptStr(notes.map(str::to_owned)),
        )
        .await
    }

    /// Update one entry's notification preferences.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_item_notifications(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
        settings: NotificationSettings,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.wishlist_item \
             SET notify_price_drop = $3, notify_back_in_stock = $4 \
             WHERE wishlist_id = $1 AND product_id = $2",
        )
        .bind(wishlist_id)
        .bind(product_id)
        .bind(settings.notify_price_drop)
        .bind(settings.notify_back_in_stock)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.touch(wishlist_id).await?;
        Ok(true)
    }

    /// Remove an entry.
    ///
    /// # Returns
    ///
    /// Returns `true` if the entry existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.wishlist_item WHERE wishlist_id = $1 AND product_id = $2",
        )
        .bind(wishlist_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.touch(wishlist_id).await?;
        Ok(true)
    }

    /// Make a wishlist public, allocating a share token the first time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist doesn't exist.
    pub async fn make_public(
        &self,
        wishlist_id: WishlistId,
        share_token: Uuid,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.wishlist \
             SET is_public = TRUE, share_token = COALESCE(share_token, $2), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(wishlist_id)
        .bind(share_token)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Make a wishlist private again. The share token is kept so a later
    /// `make_public` restores the same URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist doesn't exist.
    pub async fn make_private(&self, wishlist_id: WishlistId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.wishlist SET is_public = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(wishlist_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn items(&self, wishlist_id: WishlistId) -> Result<Vec<WishlistItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, WishlistItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM storefront.wishlist_item \
             WHERE wishlist_id = $1 ORDER BY added_at ASC"
        ))
        .bind(wishlist_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(WishlistItem::try_from).collect()
    }

    async fn update_item_column(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
        set_clause: &str,
        value: Bind,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "UPDATE storefront.wishlist_item SET {set_clause} \
             WHERE wishlist_id = $1 AND product_id = $2"
        );

        let query = sqlx::query(&sql).bind(wishlist_id).bind(product_id);
        let query = match value {
            Bind::Str(s) => query.bind(s),
            Bind::OptStr(s) => query.bind(s),
        };

        let result = query.execute(self.pool).await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        self.touch(wishlist_id).await?;
        Ok(true)
    }

    async fn touch(&self, wishlist_id: WishlistId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE storefront.wishlist SET updated_at = NOW() WHERE id = $1")
            .bind(wishlist_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

/// Single-column bind values for the targeted item updates.
enum Bind {
    Str(String),
    OptStr(Option<String>),
}
