//! Order domain types.
//!
//! Orders are immutable at creation: line items are frozen snapshots of
//! product/store data plus price and quantity at purchase time. Only the
//! status (and its history trail) mutates afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ivma_core::{CustomerId, OrderId, OrderStatus, ProductId, StatusActor, StoreId};

use super::catalog::{ProductSnapshot, StoreSnapshot};

/// A completed purchase, grouped by store.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    /// Human-facing order reference.
    pub order_number: String,
    pub store_id: StoreId,
    /// Store data frozen at purchase time.
    pub store: StoreSnapshot,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Status trail, oldest first.
    pub history: Vec<StatusHistoryEntry>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen order line.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    /// Unit price at purchase time; later catalog edits never change it.
    pub unit_price: Decimal,
    pub product: ProductSnapshot,
}

/// One entry in the status trail.
#[derive(Debug, Clone, Serialize)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub actor: StatusActor,
    pub at: DateTime<Utc>,
}

/// Listing row for order history pages; items are not loaded.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub store: StoreSnapshot,
    pub status: OrderStatus,
    pub total: Decimal,
    pub item_count: i64,
    pub placed_at: DateTime<Utc>,
}
