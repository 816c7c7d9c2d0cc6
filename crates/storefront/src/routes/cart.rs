//! Cart route handlers.
//!
//! All cart routes require authentication; the cart itself is created
//! lazily on first use.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use ivma_core::ProductId;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Cart;
use crate::services::cart::CartService;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub note: Option<String>,
}

const fn default_quantity() -> i32 {
    1
}

/// Quantity-update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}

fn cart_body(cart: &Cart) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "cart": cart,
        "subtotal": cart.subtotal(),
        "total_quantity": cart.total_quantity(),
    }))
}

/// Get the customer's cart, creating an empty one on first use.
///
/// GET /cart
///
/// # Errors
///
/// 401 without a valid session.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let cart = CartService::new(state.pool()).get_or_create(customer.id).await?;
    Ok(cart_body(&cart))
}

/// Add a product, accumulating quantity on an existing line.
///
/// POST /cart
///
/// # Errors
///
/// 404 for unknown products, 400 with `PRODUCT_NOT_AVAILABLE` or
/// `INSUFFICIENT_STOCK` (carrying the available quantity) when the product
/// cannot be added.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>> {
    let cart = CartService::new(state.pool())
        .add_item(
            customer.id,
            body.product_id,
            body.quantity,
            body.note.as_deref(),
        )
        .await?;
    Ok(cart_body(&cart))
}

/// Set a line's quantity. Zero removes the line.
///
/// PATCH /cart/items/{product_id}
///
/// # Errors
///
/// 400 for negative quantities, 404 when no line exists.
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateQuantityRequest>,
) -> Result<Json<serde_json::Value>> {
    let cart = CartService::new(state.pool())
        .update_item_quantity(customer.id, product_id, body.quantity)
        .await?;
    Ok(cart_body(&cart))
}

/// Remove a line item.
///
/// DELETE /cart/items/{product_id}
///
/// # Errors
///
/// 404 when no line exists.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let cart = CartService::new(state.pool())
        .remove_item(customer.id, product_id)
        .await?;
    Ok(cart_body(&cart))
}

/// Empty the cart. The cart row itself survives.
///
/// DELETE /cart
///
/// # Errors
///
/// 401 without a valid session.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let cart = CartService::new(state.pool()).clear(customer.id).await?;
    Ok(cart_body(&cart))
}

/// Re-check every line against current stock without mutating the cart.
///
/// POST /cart/validate
///
/// # Errors
///
/// 401 without a valid session.
pub async fn validate(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let validation = CartService::new(state.pool())
        .validate_stock(customer.id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "is_valid": validation.is_valid,
        "unavailable_items": validation.unavailable_items,
    })))
}
