//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use ivma_core::{ProductId, WishlistPriority};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{NotificationSettings, Wishlist};
use crate::services::wishlist::{WishlistError, WishlistItemOptions, WishlistService};
use crate::state::AppState;

/// Save-product request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[serde(default)]
    pub priority: WishlistPriority,
    pub notes: Option<String>,
    #[serde(default)]
    pub notify_price_drop: bool,
    #[serde(default)]
    pub notify_back_in_stock: bool,
}

/// Partial item update: only provided fields change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub priority: Option<WishlistPriority>,
    pub notes: Option<String>,
    pub notify_price_drop: Option<bool>,
    pub notify_back_in_stock: Option<bool>,
}

/// Visibility toggle request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVisibilityRequest {
    pub is_public: bool,
}

fn wishlist_body(list: &Wishlist) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "wishlist": list,
    }))
}

/// Get the customer's wishlist, creating it on first access.
///
/// GET /wishlist
///
/// # Errors
///
/// 401 without a valid session.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<Json<serde_json::Value>> {
    let list = WishlistService::new(state.pool())
        .get_or_create(&customer)
        .await?;
    Ok(wishlist_body(&list))
}

/// Save a product. Idempotent: re-adding updates metadata.
///
/// POST /wishlist
///
/// # Errors
///
/// 404 for unknown products.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>> {
    let list = WishlistService::new(state.pool())
        .add_item(
            &customer,
            body.product_id,
            WishlistItemOptions {
                priority: body.priority,
                notes: body.notes,
                notifications: NotificationSettings {
                    notify_price_drop: body.notify_price_drop,
                    notify_back_in_stock: body.notify_back_in_stock,
                },
            },
        )
        .await?;
    Ok(wishlist_body(&list))
}

/// Apply a partial update to one entry.
///
/// PUT /wishlist/{product_id}
///
/// # Errors
///
/// 400 when no field is provided, 404 when no entry exists.
pub async fn update_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<serde_json::Value>> {
    if body.priority.is_none()
        && body.notes.is_none()
        && body.notify_price_drop.is_none()
        && body.notify_back_in_stock.is_none()
    {
        return Err(AppError::BadRequest("no fields to update".to_owned()));
    }

    let service = WishlistService::new(state.pool());
    let mut list = None;

    if let Some(priority) = body.priority {
        list = Some(
            service
                .update_item_priority(customer.id, product_id, priority)
                .await?,
        );
    }

    if let Some(notes) = body.notes.as_deref() {
        list = Some(
            service
                .update_item_notes(customer.id, product_id, Some(notes))
                .await?,
        );
    }

    if body.notify_price_drop.is_some() || body.notify_back_in_stock.is_some() {
        // Merge with the entry's current settings so one flag can change
        // without resetting the other.
        let current = service
            .get_or_create(&customer)
            .await?
            .items
            .into_iter()
            .find(|item| item.product_id == product_id)
            .ok_or(AppError::Wishlist(WishlistError::ItemNotFound))?
            .notifications;

        let settings = NotificationSettings {
            notify_price_drop: body.notify_price_drop.unwrap_or(current.notify_price_drop),
            notify_back_in_stock: body
                .notify_back_in_stock
                .unwrap_or(current.notify_back_in_stock),
        };

        list = Some(
            service
                .update_notification_settings(customer.id, product_id, settings)
                .await?,
        );
    }

    // At least one branch ran; the guard above rejected empty updates.
    let list = list.ok_or_else(|| AppError::BadRequest("no fields to update".to_owned()))?;
    Ok(wishlist_body(&list))
}

/// Toggle public/private visibility.
///
/// PUT /wishlist
///
/// Making a list public allocates a share token the first time; making it
/// private keeps the token so the URL survives a later re-share.
///
/// # Errors
///
/// 401 without a valid session.
pub async fn set_visibility(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Json(body): Json<SetVisibilityRequest>,
) -> Result<Json<serde_json::Value>> {
    let service = WishlistService::new(state.pool());

    let list = if body.is_public {
        service.make_public(&customer).await?
    } else {
        service.make_private(&customer).await?
    };

    Ok(wishlist_body(&list))
}

/// Remove an entry.
///
/// DELETE /wishlist/{product_id}
///
/// # Errors
///
/// 404 when no entry exists.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let list = WishlistService::new(state.pool())
        .remove_item(customer.id, product_id)
        .await?;
    Ok(wishlist_body(&list))
}
