//! Public product lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use ivma_core::ProductId;

use crate::error::{AppError, Result};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Product detail.
///
/// GET /products/{id}
///
/// Inactive and web-hidden products look exactly like missing ones.
///
/// # Errors
///
/// 404 when the product does not exist or is not web-visible.
pub async fn show(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    let catalog = CatalogService::new(state.pool(), state.store_cache());

    let product = catalog
        .get_product(product_id)
        .await
        .map_err(AppError::Database)?
        .filter(|p| p.is_sellable())
        .ok_or_else(|| AppError::NotFound("product".to_owned()))?;

    Ok(Json(json!({
        "success": true,
        "product": product,
    })))
}
