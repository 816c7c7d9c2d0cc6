//! Order repository.
//!
//! Orders and their line items are written once at checkout (outside this
//! service) and never mutated here except for the status column and its
//! append-only history trail. Every read is scoped by customer so a guessed
//! order ID belonging to someone else behaves like a missing row.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ivma_core::{CustomerId, OrderId, OrderStatus, ProductId, StatusActor, StoreId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderSummary, ProductSnapshot, StatusHistoryEntry, StoreSnapshot};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    customer_id: CustomerId,
    order_number: String,
    store_id: StoreId,
    store_name: String,
    store_slug: String,
    status: String,
    total: Decimal,
    placed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    order_number: String,
    store_name: String,
    store_slug: String,
    status: String,
    total: Decimal,
    item_count: i64,
    placed_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
    product_name: String,
    product_sku: String,
    product_image_url: Option<String>,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    status: String,
    note: Option<String>,
    actor: String,
    changed_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<OrderStatus, RepositoryError> {
    OrderStatus::from_str(s)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid order status: {e}")))
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a customer's orders, newest first, optionally filtered by
    /// status, with offset pagination.
    ///
    /// An empty `statuses` slice means no status filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[OrderStatus],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let status_filter: Vec<String> =
            statuses.iter().map(|s| s.as_str().to_owned()).collect();

        let rows = sqlx::query_as::<_, OrderSummaryRow>(
            "SELECT o.id, o.order_number, o.store_name, o.store_slug, o.status, o.total, \
                    (SELECT COUNT(*) FROM storefront.order_item oi WHERE oi.order_id = o.id) \
                        AS item_count, \
                    o.placed_at \
             FROM storefront.customer_order o \
             WHERE o.customer_id = $1 \
               AND (cardinality($2::text[]) = 0 OR o.status = ANY($2)) \
             ORDER BY o.placed_at DESC \
             LIMIT $3 OFFSET $4",
        )
        .bind(customer_id)
        .bind(&status_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderSummary {
                    id: r.id,
                    order_number: r.order_number,
                    store: StoreSnapshot {
                        name: r.store_name,
                        slug: r.store_slug,
                    },
                    status: parse_status(&r.status)?,
                    total: r.total,
                    item_count: r.item_count,
                    placed_at: r.placed_at,
                })
            })
            .collect()
    }

    /// Count a customer's orders under the same status filter as
    /// [`Self::list_for_customer`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_customer(
        &self,
        customer_id: CustomerId,
        statuses: &[OrderStatus],
    ) -> Result<i64, RepositoryError> {
        let status_filter: Vec<String> =
            statuses.iter().map(|s| s.as_str().to_owned()).collect();

        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM storefront.customer_order \
             WHERE customer_id = $1 \
               AND (cardinality($2::text[]) = 0 OR status = ANY($2))",
        )
        .bind(customer_id)
        .bind(&status_filter)
        .fetch_one(self.pool)
        .await?;

        Ok(count.0)
    }

    /// Per-status order counts for a customer, across all their orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<(OrderStatus, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM storefront.customer_order \
             WHERE customer_id = $1 GROUP BY status",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(status, count)| Ok((parse_status(&status)?, count)))
            .collect()
    }

    /// Ownership-scoped order fetch with items and history.
    ///
    /// Returns `None` both for unknown IDs and for orders belonging to a
    /// different customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_by_id(
        &self,
        customer_id: CustomerId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, customer_id, order_number, store_id, store_name, store_slug, \
                    status, total, placed_at, updated_at \
             FROM storefront.customer_order \
             WHERE id = $1 AND customer_id = $2",
        )
        .bind(order_id)
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(order) = row else {
            return Ok(None);
        };

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT product_id, quantity, unit_price, product_name, product_sku, \
                    product_image_url \
             FROM storefront.order_item WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        let history_rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT status, note, actor, changed_at \
             FROM storefront.order_status_history \
             WHERE order_id = $1 ORDER BY changed_at ASC, id ASC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        let items = item_rows
            .into_iter()
            .map(|r| OrderItem {
                product_id: r.product_id,
                quantity: r.quantity,
                unit_price: r.unit_price,
                product: ProductSnapshot {
                    name: r.product_name,
                    sku: r.product_sku,
                    image_url: r.product_image_url,
                },
            })
            .collect();

        let history = history_rows
            .into_iter()
            .map(|r| {
                let actor = StatusActor::from_str(&r.actor).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid status actor: {e}"))
                })?;
                Ok(StatusHistoryEntry {
                    status: parse_status(&r.status)?,
                    note: r.note,
                    actor,
                    at: r.changed_at,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Some(Order {
            id: order.id,
            customer_id: order.customer_id,
            order_number: order.order_number,
            store_id: order.store_id,
            store: StoreSnapshot {
                name: order.store_name,
                slug: order.store_slug,
            },
            status: parse_status(&order.status)?,
            items,
            history,
            total: order.total,
            placed_at: order.placed_at,
            updated_at: order.updated_at,
        }))
    }

    /// Set the current status and append the matching history entry in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        note: Option<&str>,
        actor: StatusActor,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE storefront.customer_order SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(order_id)
        .bind(status.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO storefront.order_status_history (order_id, status, note, actor) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(note)
        .bind(actor.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}
