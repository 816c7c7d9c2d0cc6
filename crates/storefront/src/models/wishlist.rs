//! Wishlist domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ivma_core::{CustomerId, ProductId, StoreId, WishlistId, WishlistPriority};

use super::catalog::{ProductSnapshot, StoreSnapshot};

/// A customer's wishlist. At most one per customer, created lazily.
#[derive(Debug, Clone, Serialize)]
pub struct Wishlist {
    pub id: WishlistId,
    pub customer_id: CustomerId,
    pub name: String,
    pub description: Option<String>,
    /// Public wishlists are reachable through their share token.
    pub is_public: bool,
    /// Allocated once, the first time the list is made public.
    pub share_token: Option<Uuid>,
    /// Denormalized owner snapshot for shared views.
    pub owner_first_name: String,
    pub owner_last_name: String,
    pub items: Vec<WishlistItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A saved product. One entry per product; re-adding updates metadata.
#[derive(Debug, Clone, Serialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub priority: WishlistPriority,
    pub notes: Option<String>,
    pub notifications: NotificationSettings,
    pub product: ProductSnapshot,
    pub store: StoreSnapshot,
    pub added_at: DateTime<Utc>,
}

/// Per-item notification preferences.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct NotificationSettings {
    pub notify_price_drop: bool,
    pub notify_back_in_stock: bool,
}
