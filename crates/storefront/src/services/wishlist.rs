//! Wishlist service.
//!
//! Lazy per-customer wishlist with idempotent adds, targeted metadata
//! updates, and the public/private sharing toggle.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use ivma_core::{CustomerId, ProductId, WishlistPriority};

use crate::db::catalog::CatalogRepository;
use crate::db::wishlists::{NewWishlistItem, WishlistRepository};
use crate::db::RepositoryError;
use crate::models::{
    CurrentCustomer, NotificationSettings, ProductSnapshot, StoreSnapshot, Wishlist,
};

/// Attempts at first-time wishlist creation before giving up.
const CREATE_RETRIES: u32 = 3;

/// Backoff between creation attempts.
const CREATE_BACKOFF_MS: u64 = 25;

/// Errors that can occur during wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// Referenced product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// No wishlist entry for that product.
    #[error("wishlist item not found")]
    ItemNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Metadata accepted when saving a product.
#[derive(Debug, Default)]
pub struct WishlistItemOptions {
    pub priority: WishlistPriority,
    pub notes: Option<String>,
    pub notifications: NotificationSettings,
}

/// Wishlist service.
pub struct WishlistService<'a> {
    wishlists: WishlistRepository<'a>,
    catalog: CatalogRepository<'a>,
}

impl<'a> WishlistService<'a> {
    /// Create a new wishlist service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            wishlists: WishlistRepository::new(pool),
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Return the customer's wishlist, creating it on first access.
    ///
    /// Creation is seeded with a denormalized owner snapshot so shared
    /// views don't need a customer join. Concurrent first-time calls are
    /// resolved the same way as cart creation: bounded retry on conflict.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the database fails.
    pub async fn get_or_create(
        &self,
        customer: &CurrentCustomer,
    ) -> Result<Wishlist, WishlistError> {
        for attempt in 0..CREATE_RETRIES {
            if let Some(list) = self.wishlists.get_by_customer(customer.id).await? {
                return Ok(list);
            }

            let name = format!("{}'s wishlist", customer.first_name);
            match self
                .wishlists
                .create(customer.id, &name, &customer.first_name, &customer.last_name)
                .await
            {
                Ok(list) => return Ok(list),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::debug!(customer_id = %customer.id, attempt,
                        "Lost wishlist creation race, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(CREATE_BACKOFF_MS)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.wishlists
            .get_by_customer(customer.id)
            .await?
            .ok_or_else(|| {
                WishlistError::Repository(RepositoryError::Conflict(
                    "wishlist creation race not resolved".to_owned(),
                ))
            })
    }

    /// Save a product. Idempotent per product: re-adding updates priority,
    /// notes, and notification flags instead of duplicating the entry.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ProductNotFound` for unknown products.
    pub async fn add_item(
        &self,
        customer: &CurrentCustomer,
        product_id: ProductId,
        options: WishlistItemOptions,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.get_or_create(customer).await?;

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(WishlistError::ProductNotFound)?;

        let store = self
            .catalog
            .get_store(product.store_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "product {product_id} references missing store"
                ))
            })?;

        let product_snapshot = ProductSnapshot::from(&product);
        let store_snapshot = StoreSnapshot::from(&store);

        self.wishlists
            .upsert_item(
                list.id,
                &NewWishlistItem {
                    product_id,
                    store_id: product.store_id,
                    priority: options.priority,
                    notes: options.notes.as_deref(),
                    notifications: options.notifications,
                    product: &product_snapshot,
                    store: &store_snapshot,
                },
            )
            .await?;

        tracing::info!(customer_id = %customer.id, product_id = %product_id,
            "Wishlist item saved");

        self.reload(customer.id).await
    }

    /// Update one entry's priority.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ItemNotFound` when no entry exists.
    pub async fn update_item_priority(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        priority: WishlistPriority,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.existing(customer_id).await?;

        if !self
            .wishlists
            .update_item_priority(list.id, product_id, priority)
            .await?
        {
            return Err(WishlistError::ItemNotFound);
        }

        self.reload(customer_id).await
    }

    /// Update one entry's free-text notes.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ItemNotFound` when no entry exists.
    pub async fn update_item_notes(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        notes: Option<&str>,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.existing(customer_id).await?;

        if !self
            .wishlists
            .update_item_notes(list.id, product_id, notes)
            .await?
        {
            return Err(WishlistError::ItemNotFound);
        }

        self.reload(customer_id).await
    }

    /// Update one entry's notification preferences.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ItemNotFound` when no entry exists.
    pub async fn update_notification_settings(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        settings: NotificationSettings,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.existing(customer_id).await?;

        if !self
            .wishlists
            .update_item_notifications(list.id, product_id, settings)
            .await?
        {
            return Err(WishlistError::ItemNotFound);
        }

        self.reload(customer_id).await
    }

    /// Remove an entry.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::ItemNotFound` when no entry exists.
    pub async fn remove_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.existing(customer_id).await?;

        if !self.wishlists.remove_item(list.id, product_id).await? {
            return Err(WishlistError::ItemNotFound);
        }

        tracing::info!(customer_id = %customer_id, product_id = %product_id,
            "Wishlist item removed");

        self.reload(customer_id).await
    }

    /// Make the wishlist public, allocating a share token the first time.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the database fails.
    pub async fn make_public(
        &self,
        customer: &CurrentCustomer,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.get_or_create(customer).await?;
        self.wishlists.make_public(list.id, Uuid::new_v4()).await?;

        tracing::info!(customer_id = %customer.id, "Wishlist made public");

        self.reload(customer.id).await
    }

    /// Make the wishlist private again.
    ///
    /// # Errors
    ///
    /// Returns `WishlistError::Repository` if the database fails.
    pub async fn make_private(
        &self,
        customer: &CurrentCustomer,
    ) -> Result<Wishlist, WishlistError> {
        let list = self.get_or_create(customer).await?;
        self.wishlists.make_private(list.id).await?;

        tracing::info!(customer_id = %customer.id, "Wishlist made private");

        self.reload(customer.id).await
    }

    async fn existing(&self, customer_id: CustomerId) -> Result<Wishlist, WishlistError> {
        self.wishlists
            .get_by_customer(customer_id)
            .await?
            .ok_or(WishlistError::ItemNotFound)
    }

    async fn reload(&self, customer_id: CustomerId) -> Result<Wishlist, WishlistError> {
        self.wishlists
            .get_by_customer(customer_id)
            .await?
            .ok_or_else(|| WishlistError::Repository(RepositoryError::NotFound))
    }
}
