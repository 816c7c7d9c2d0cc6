//! Catalog domain types: stores, products, and the snapshots other
//! aggregates freeze at line-item creation time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ivma_core::{ProductId, StoreId};

/// A seller's public store profile. Read-mostly reference data.
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// URL-safe unique identifier used in public store pages.
    pub slug: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub instagram_handle: Option<String>,
    /// Platform user that owns this store.
    pub owner_user_id: i32,
    pub created_at: DateTime<Utc>,
}

/// A sellable product.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
    pub sku: String,
    /// Current unit price; carts and orders snapshot this at add time.
    pub unit_price: Decimal,
    pub stock_quantity: i32,
    /// Inactive products are hidden from storefront operations.
    pub is_active: bool,
    /// Active products can still be withheld from the web storefront.
    pub is_web_visible: bool,
    pub image_url: Option<String>,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        self.is_active && self.is_web_visible
    }
}

/// Denormalized product data frozen at the moment a cart/wishlist/order
/// line item was created. Later catalog edits must not alter it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub name: String,
    pub sku: String,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            sku: product.sku.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Denormalized store data frozen alongside a [`ProductSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub name: String,
    pub slug: String,
}

impl From<&Store> for StoreSnapshot {
    fn from(store: &Store) -> Self {
        Self {
            name: store.name.clone(),
            slug: store.slug.clone(),
        }
    }
}
