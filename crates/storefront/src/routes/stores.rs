//! Public store page lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::services::catalog::CatalogService;
use crate::state::AppState;

/// Store profile by slug.
///
/// GET /stores/{slug}
///
/// Served through the store-profile cache.
///
/// # Errors
///
/// 404 for unknown slugs.
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let catalog = CatalogService::new(state.pool(), state.store_cache());

    let store = catalog
        .get_store_by_slug(&slug)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("store".to_owned()))?;

    Ok(Json(json!({
        "success": true,
        "store": store,
    })))
}
