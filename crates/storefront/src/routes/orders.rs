//! Order route handlers.
//!
//! Read/status side only; checkout creates orders elsewhere. Requests
//! arrive authenticated as a customer, so status changes go through the
//! `Customer` actor role (which the service limits to cancellation).

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;

use ivma_core::{OrderId, OrderStatus, StatusActor};

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::orders::{OrderFilters, OrderService};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Comma-separated status filter, e.g. `status=pending,confirmed`.
    pub status: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Status-change request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// Paginated order history with aggregate stats.
///
/// GET /orders
///
/// # Errors
///
/// 400 for an unknown status in the filter.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>> {
    let statuses = match query.status.as_deref() {
        Some(raw) => raw
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                OrderStatus::from_str(s.trim())
                    .map_err(|e| AppError::BadRequest(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    let page = OrderService::new(state.pool())
        .list_for_customer(
            customer.id,
            &OrderFilters {
                statuses,
                page: query.page.unwrap_or(1),
                per_page: query.per_page.unwrap_or(0),
            },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "orders": page.orders,
        "total": page.total,
        "page": page.page,
        "per_page": page.per_page,
        "stats": page.stats,
    })))
}

/// Single order, ownership-scoped.
///
/// GET /orders/{id}
///
/// # Errors
///
/// 404 for unknown IDs and for orders owned by another customer.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<Json<serde_json::Value>> {
    let order = OrderService::new(state.pool())
        .get(customer.id, order_id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "order": order,
    })))
}

/// Request a status change as the customer.
///
/// PATCH /orders/{id}/status
///
/// # Errors
///
/// 409 with `INVALID_TRANSITION` for moves outside the transition table,
/// 403 when the customer role may not request the target status.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
    Path(order_id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<serde_json::Value>> {
    let order = OrderService::new(state.pool())
        .update_status(
            customer.id,
            order_id,
            body.status,
            body.note.as_deref(),
            StatusActor::Customer,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated.",
        "order": order,
    })))
}
