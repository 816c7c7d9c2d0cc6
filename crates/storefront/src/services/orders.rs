//! Order service (read/status side).
//!
//! Order creation happens at checkout, outside this service. Here: the
//! customer's order history with filtering, pagination, and per-status
//! stats; ownership-scoped lookups; and status changes constrained by the
//! explicit transition table on [`OrderStatus`].

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use ivma_core::{CustomerId, OrderId, OrderStatus, StatusActor};

use crate::db::orders::OrderRepository;
use crate::db::RepositoryError;
use crate::models::{Order, OrderSummary};

/// Default page size for order listings.
const DEFAULT_PER_PAGE: i64 = 20;

/// Upper bound on requested page size.
const MAX_PER_PAGE: i64 = 100;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order does not exist, or belongs to a different customer. The two
    /// are indistinguishable so IDs cannot be probed.
    #[error("order not found")]
    NotFound,

    /// The transition table does not allow this status change.
    #[error("cannot transition order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The acting role may not perform this status change (customers may
    /// only cancel).
    #[error("{actor:?} may not set status {to}")]
    ActorNotAllowed { actor: StatusActor, to: OrderStatus },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Listing parameters.
#[derive(Debug, Default)]
pub struct OrderFilters {
    /// Statuses to include; empty means all.
    pub statuses: Vec<OrderStatus>,
    /// 1-based page number.
    pub page: i64,
    /// Page size (clamped to [1, 100]).
    pub per_page: i64,
}

/// Aggregate stats returned alongside every listing page.
#[derive(Debug, Serialize)]
pub struct OrderStats {
    /// Total orders for the customer, ignoring the status filter.
    pub total_orders: i64,
    /// Order count per status, zero-filled for statuses with no orders.
    pub by_status: BTreeMap<&'static str, i64>,
}

/// One page of a customer's order history.
#[derive(Debug, Serialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    /// Total rows matching the filter (for pagination).
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub stats: OrderStats,
}

/// Order service.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool),
        }
    }

    /// List a customer's orders with pagination and per-status stats.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if a query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        filters: &OrderFilters,
    ) -> Result<OrderPage, OrderError> {
        let page = filters.page.max(1);
        let per_page = if filters.per_page < 1 {
            DEFAULT_PER_PAGE
        } else {
            filters.per_page.min(MAX_PER_PAGE)
        };
        let offset = (page - 1) * per_page;

        let orders = self
            .orders
            .list_for_customer(customer_id, &filters.statuses, per_page, offset)
            .await?;

        let total = self
            .orders
            .count_for_customer(customer_id, &filters.statuses)
            .await?;

        let counts = self.orders.status_counts(customer_id).await?;
        let mut by_status: BTreeMap<&'static str, i64> =
            OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        let mut total_orders = 0;
        for (status, count) in counts {
            by_status.insert(status.as_str(), count);
            total_orders += count;
        }

        Ok(OrderPage {
            orders,
            total,
            page,
            per_page,
            stats: OrderStats {
                total_orders,
                by_status,
            },
        })
    }

    /// Ownership-scoped order fetch.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown IDs and for orders owned
    /// by a different customer.
    pub async fn get(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
    ) -> Result<Order, OrderError> {
        self.orders
            .get_by_id(customer_id, order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Move an order to a new status, appending a history entry.
    ///
    /// The transition must be allowed by [`OrderStatus::can_transition_to`]
    /// and the actor must be permitted to request it.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` for moves outside the
    /// table and `OrderError::ActorNotAllowed` when the role may not
    /// perform the change.
    pub async fn update_status(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
        new_status: OrderStatus,
        note: Option<&str>,
        actor: StatusActor,
    ) -> Result<Order, OrderError> {
        let order = self.get(customer_id, order_id).await?;

        if !actor.may_set(new_status) {
            return Err(OrderError::ActorNotAllowed {
                actor,
                to: new_status,
            });
        }

        if !order.status.can_transition_to(new_status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        self.orders
            .update_status(order_id, new_status, note, actor)
            .await?;

        tracing::info!(order_id = %order_id, from = %order.status, to = %new_status,
            actor = actor.as_str(), "Order status updated");

        self.get(customer_id, order_id).await
    }
}
