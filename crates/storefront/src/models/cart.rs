//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ivma_core::{CartId, CustomerId, ProductId, StoreId};

use super::catalog::{ProductSnapshot, StoreSnapshot};

/// A customer's shopping cart. At most one per customer.
///
/// Cleared but never deleted on checkout/clear.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    /// Line items in insertion order.
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// A cart with zero remaining lines reports empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single cart line. One line per product; re-adding accumulates
/// quantity instead of duplicating.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub store_id: StoreId,
    /// Always >= 1; a zero-quantity update removes the line instead.
    pub quantity: i32,
    /// Unit price captured when the line was first added.
    pub unit_price: Decimal,
    /// Product data frozen at add time for display stability.
    pub product: ProductSnapshot,
    /// Store data frozen at add time.
    pub store: StoreSnapshot,
    pub note: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i32, quantity: i32, cents: i64) -> CartItem {
        CartItem {
            product_id: ProductId::new(product_id),
            store_id: StoreId::new(1),
            quantity,
            unit_price: Decimal::new(cents, 2),
            product: ProductSnapshot {
                name: "Widget".into(),
                sku: format!("SKU-{product_id}"),
                image_url: None,
            },
            store: StoreSnapshot {
                name: "Widget Co".into(),
                slug: "widget-co".into(),
            },
            note: None,
            added_at: Utc::now(),
        }
    }

    fn cart(items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(1),
            customer_id: CustomerId::new(1),
            items,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let cart = cart(vec![item(1, 2, 1050), item(2, 1, 499)]);
        assert_eq!(cart.subtotal(), Decimal::new(2599, 2));
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_empty_cart() {
        let cart = cart(vec![]);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }
}
