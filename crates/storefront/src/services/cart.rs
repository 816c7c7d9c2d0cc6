//! Cart service.
//!
//! Business rules over the cart repository: lazy creation with a bounded
//! retry on the one-cart-per-customer race, availability and stock checks
//! at add time, and the pre-checkout stock re-validation.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use ivma_core::{CustomerId, ProductId};

use crate::db::carts::{CartRepository, NewCartItem};
use crate::db::catalog::CatalogRepository;
use crate::db::RepositoryError;
use crate::models::{Cart, ProductSnapshot, StoreSnapshot};

/// Attempts at first-time cart creation before giving up.
const CREATE_RETRIES: u32 = 3;

/// Backoff between creation attempts.
const CREATE_BACKOFF_MS: u64 = 25;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Referenced product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// Product exists but is inactive or hidden from the web storefront.
    #[error("product is not available")]
    ProductNotAvailable,

    /// Requested quantity exceeds current stock. Carries what IS available
    /// so the client can adjust.
    #[error("insufficient stock: {available} available")]
    InsufficientStock { available: i32 },

    /// Quantity must not be negative (zero removes the line).
    #[error("invalid quantity")]
    InvalidQuantity,

    /// No cart line for that product.
    #[error("cart item not found")]
    ItemNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of re-checking a cart against current stock. Non-mutating.
#[derive(Debug, Serialize)]
pub struct StockValidation {
    pub is_valid: bool,
    pub unavailable_items: Vec<UnavailableItem>,
}

/// One cart line that can no longer be fulfilled as-is.
#[derive(Debug, Serialize)]
pub struct UnavailableItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub requested: i32,
    pub available: i32,
    pub reason: UnavailableReason,
}

/// Why a line failed validation.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    ProductMissing,
    ProductNotAvailable,
    InsufficientStock,
}

/// Cart service.
pub struct CartService<'a> {
    carts: CartRepository<'a>,
    catalog: CatalogRepository<'a>,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            carts: CartRepository::new(pool),
            catalog: CatalogRepository::new(pool),
        }
    }

    /// Return the customer's cart, creating an empty one on first use.
    ///
    /// Concurrent first-time calls race on the unique constraint; losing
    /// the race means someone else created the cart, so we re-read with a
    /// short backoff instead of surfacing the conflict.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails, or if the
    /// race still cannot be resolved after bounded retries.
    pub async fn get_or_create(&self, customer_id: CustomerId) -> Result<Cart, CartError> {
        for attempt in 0..CREATE_RETRIES {
            if let Some(cart) = self.carts.get_by_customer(customer_id).await? {
                return Ok(cart);
            }

            match self.carts.create(customer_id).await {
                Ok(cart) => return Ok(cart),
                Err(RepositoryError::Conflict(_)) => {
                    tracing::debug!(customer_id = %customer_id, attempt,
                        "Lost cart creation race, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(CREATE_BACKOFF_MS)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }

        // The conflict means the row exists; one last read settles it.
        self.carts
            .get_by_customer(customer_id)
            .await?
            .ok_or_else(|| {
                CartError::Repository(RepositoryError::Conflict(
                    "cart creation race not resolved".to_owned(),
                ))
            })
    }

    /// Add a product to the cart, accumulating quantity if a line already
    /// exists. Captures the price and product/store snapshot at add time.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` for unknown products,
    /// `CartError::ProductNotAvailable` for inactive or hidden ones, and
    /// `CartError::InsufficientStock` when the line total would exceed
    /// current stock.
    pub async fn add_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i32,
        note: Option<&str>,
    ) -> Result<Cart, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let cart = self.get_or_create(customer_id).await?;

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if !product.is_sellable() {
            return Err(CartError::ProductNotAvailable);
        }

        let existing_quantity = cart
            .items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or(0, |item| item.quantity);

        if existing_quantity + quantity > product.stock_quantity {
            return Err(CartError::InsufficientStock {
                available: product.stock_quantity,
            });
        }

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

        self.carts
            .upsert_item(
                cart.id,
                &NewCartItem {
                    product_id,
                    store_id: product.store_id,
                    quantity,
                    unit_price: product.unit_price,
                    product: &product_snapshot,
                    store: &store_snapshot,
                    note,
                },
            )
            .await?;

        tracing::info!(customer_id = %customer_id, product_id = %product_id, quantity,
            "Cart item added");

        self.reload(customer_id).await
    }

    /// Set a line's quantity. Zero removes the line, negative is rejected.
    ///
    /// Stock is NOT re-checked here; `validate_stock` runs before checkout.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for negative quantities and
    /// `CartError::ItemNotFound` when no line exists for the product.
    pub async fn update_item_quantity(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        if quantity < 0 {
            return Err(CartError::InvalidQuantity);
        }

        let cart = self
            .carts
            .get_by_customer(customer_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        let found = if quantity == 0 {
            self.carts.remove_item(cart.id, product_id).await?
        } else {
            self.carts
                .set_item_quantity(cart.id, product_id, quantity)
                .await?
        };

        if !found {
            return Err(CartError::ItemNotFound);
        }

        tracing::info!(customer_id = %customer_id, product_id = %product_id, quantity,
            "Cart item quantity updated");

        self.reload(customer_id).await
    }

    /// Remove a line item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` when no line exists.
    pub async fn remove_item(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        let cart = self
            .carts
            .get_by_customer(customer_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        if !self.carts.remove_item(cart.id, product_id).await? {
            return Err(CartError::ItemNotFound);
        }

        tracing::info!(customer_id = %customer_id, product_id = %product_id,
            "Cart item removed");

        self.reload(customer_id).await
    }

    /// Empty the cart without deleting the cart row.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    pub async fn clear(&self, customer_id: CustomerId) -> Result<Cart, CartError> {
        let cart = self.get_or_create(customer_id).await?;
        self.carts.clear(cart.id).await?;

        tracing::info!(customer_id = %customer_id, "Cart cleared");

        self.reload(customer_id).await
    }

    /// Re-check every line against current availability and stock without
    /// mutating the cart. Used before checkout.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    pub async fn validate_stock(
        &self,
        customer_id: CustomerId,
    ) -> Result<StockValidation, CartError> {
        let Some(cart) = self.carts.get_by_customer(customer_id).await? else {
            return Ok(StockValidation {
                is_valid: true,
                unavailable_items: Vec::new(),
            });
        };

        let ids: Vec<ProductId> = cart.items.iter().map(|item| item.product_id).collect();
        let products: HashMap<ProductId, _> = self
            .catalog
            .get_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut unavailable_items = Vec::new();
        for item in &cart.items {
            match products.get(&item.product_id) {
                None => unavailable_items.push(UnavailableItem {
                    product_id: item.product_id,
                    product_name: item.product.name.clone(),
                    requested: item.quantity,
                    available: 0,
                    reason: UnavailableReason::ProductMissing,
                }),
                Some(product) if !product.is_sellable() => {
                    unavailable_items.push(UnavailableItem {
                        product_id: item.product_id,
                        product_name: item.product.name.clone(),
                        requested: item.quantity,
                        available: 0,
                        reason: UnavailableReason::ProductNotAvailable,
                    });
                }
                Some(product) if product.stock_quantity < item.quantity => {
                    unavailable_items.push(UnavailableItem {
                        product_id: item.product_id,
                        product_name: item.product.name.clone(),
                        requested: item.quantity,
                        available: product.stock_quantity,
                        reason: UnavailableReason::InsufficientStock,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(StockValidation {
            is_valid: unavailable_items.is_empty(),
            unavailable_items,
        })
    }

    async fn reload(&self, customer_id: CustomerId) -> Result<Cart, CartError> {
        self.carts
            .get_by_customer(customer_id)
            .await?
            .ok_or_else(|| CartError::Repository(RepositoryError::NotFound))
    }
}
