//! Order repository: admin order management and merchant order views.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use luxora_core::order::timeline;
use luxora_core::pagination::{Page, Paginated};
use luxora_core::{MerchantId, OrderId, OrderStatus, PaymentStatus, UserId};

use super::{RepositoryError, search_pattern};
use crate::models::{MerchantOrder, OrderDetail, OrderItem, OrderSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    customer_id: UserId,
    customer_name: String,
    customer_email: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    shipping_address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_detail(self, items: Vec<OrderItem>) -> OrderDetail {
        OrderDetail {
            timeline: timeline(self.status, self.created_at, self.updated_at),
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_email: self.customer_email,
            status: self.status,
            payment_status: self.payment_status,
            subtotal: self.subtotal,
            discount: self.discount,
            tax: self.tax,
            shipping: self.shipping,
            total: self.total,
            shipping_address: self.shipping_address,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MerchantOrderRow {
    id: OrderId,
    order_number: String,
    customer_name: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
}

const SUMMARY_SELECT: &str = r"
    SELECT o.id, o.order_number, u.name AS customer_name, u.email AS customer_email,
           o.status, o.payment_status, o.total, o.created_at,
           (SELECT COALESCE(SUM(i.quantity), 0)::int8 FROM luxora.order_items i
            WHERE i.order_id = o.id) AS item_count
    FROM luxora.orders o
    JOIN luxora.users u ON u.id = o.user_id
    WHERE TRUE
";

const ITEM_SELECT: &str = r"
    SELECT i.id, i.order_id, i.product_id, i.product_name, i.merchant_id,
           m.name AS merchant_name, i.unit_price, i.quantity, i.line_discount,
           i.selected_color, i.selected_size
    FROM luxora.order_items i
    JOIN luxora.merchants m ON m.id = i.merchant_id
";

/// Order list filters.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Matches order number, customer name or email.
    pub query: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderFilter) {
    if let Some(status) = filter.status {
        qb.push(" AND o.status = ").push_bind(status);
    }
    if let Some(pattern) = search_pattern(filter.query.as_deref()) {
        qb.push(" AND (o.order_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Payment status after an order moves to `next`.
const fn payment_after(next: OrderStatus, current: PaymentStatus) -> PaymentStatus {
    match (next, current) {
        (OrderStatus::Cancelled, PaymentStatus::Paid) => PaymentStatus::Refunded,
        _ => current,
    }
}

/// Put the quantities of a cancelled order back on the shelf.
async fn restock(conn: &mut PgConnection, id: OrderId) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE luxora.products p
        SET stock = p.stock + lines.quantity
        FROM (
            SELECT product_id, SUM(quantity)::int AS quantity
            FROM luxora.order_items
            WHERE order_id = $1
            GROUP BY product_id
        ) lines
        WHERE p.id = lines.product_id
        ",
    )
    .bind(id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders as seen by the dashboards.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &OrderFilter,
        page: Page,
    ) -> Result<Paginated<OrderSummary>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM luxora.orders o JOIN luxora.users u ON u.id = o.user_id WHERE TRUE",
        );
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY o.created_at DESC, o.id DESC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let orders: Vec<OrderSummary> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok(Paginated::new(orders, page, total))
    }

    /// An order with its items and timeline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT o.id, o.order_number, o.user_id AS customer_id, u.name AS customer_name,
                   u.email AS customer_email, o.status, o.payment_status, o.subtotal,
                   o.discount, o.tax, o.shipping, o.total, o.shipping_address,
                   o.created_at, o.updated_at
            FROM luxora.orders o
            JOIN luxora.users u ON u.id = o.user_id
            WHERE o.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{ITEM_SELECT} WHERE i.order_id = $1 ORDER BY i.id"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(row.into_detail(items)))
    }

    /// Move an order to `next`.
    ///
    /// Cancelling returns the ordered quantities to stock and refunds a paid
    /// order. Setting the current status again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist and
    /// `RepositoryError::Transition` if the change is not allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
    ) -> Result<OrderStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (current, payment) = sqlx::query_as::<_, (OrderStatus, PaymentStatus)>(
            "SELECT status, payment_status FROM luxora.orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let Some(next) = current.transition(next)? else {
            return Ok(current);
        };

        sqlx::query("UPDATE luxora.orders SET status = $2, payment_status = $3 WHERE id = $1")
            .bind(id)
            .bind(next)
            .bind(payment_after(next, payment))
            .execute(&mut *tx)
            .await?;

        if next == OrderStatus::Cancelled {
            let restocked = restock(&mut tx, id).await?;
            tracing::info!(order_id = %id, restocked, "Cancelled order restocked");
        }

        tx.commit().await?;
        Ok(next)
    }

    /// Orders containing `merchant`'s items, newest first, each carrying only
    /// that merchant's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_merchant(
        &self,
        merchant: MerchantId,
        page: Page,
    ) -> Result<Paginated<MerchantOrder>, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT order_id) FROM luxora.order_items WHERE merchant_id = $1",
        )
        .bind(merchant)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, MerchantOrderRow>(
            r"
            SELECT o.id, o.order_number, u.name AS customer_name, o.status,
                   o.payment_status, o.created_at
            FROM luxora.orders o
            JOIN luxora.users u ON u.id = o.user_id
            WHERE EXISTS (
                SELECT 1 FROM luxora.order_items i
                WHERE i.order_id = o.id AND i.merchant_id = $1
            )
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(merchant)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "{ITEM_SELECT} WHERE i.order_id = ANY($1) AND i.merchant_id = $2 ORDER BY i.id"
        ))
        .bind(&ids)
        .bind(merchant)
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(assemble_merchant_orders(rows, items), page, total))
    }
}

fn assemble_merchant_orders(
    rows: Vec<MerchantOrderRow>,
    items: Vec<OrderItem>,
) -> Vec<MerchantOrder> {
    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            let merchant_total = items.iter().map(OrderItem::line_total).sum();
            MerchantOrder {
                id: row.id,
                order_number: row.order_number,
                customer_name: row.customer_name,
                status: row.status,
                payment_status: row.payment_status,
                items,
                merchant_total,
                created_at: row.created_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use luxora_core::ProductId;

    use super::*;

    fn item(id: i32, order: i32, price: Decimal, quantity: i32) -> OrderItem {
        OrderItem {
            id: id.into(),
            order_id: OrderId::new(order),
            product_id: ProductId::new(id),
            product_name: format!("Product {id}"),
            merchant_id: MerchantId::new(1),
            merchant_name: "Atelier".to_string(),
            unit_price: price,
            quantity,
            line_discount: Decimal::ZERO,
            selected_color: None,
            selected_size: None,
        }
    }

    fn row(id: i32) -> MerchantOrderRow {
        MerchantOrderRow {
            id: OrderId::new(id),
            order_number: format!("LX-0000000{id}"),
            customer_name: "Ada".to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            created_at: DateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_merchant_orders_keep_row_order_and_sum_lines() {
        let orders = assemble_merchant_orders(
            vec![row(2), row(1)],
            vec![
                item(10, 1, Decimal::new(2000, 2), 1),
                item(11, 2, Decimal::new(1250, 2), 2),
                item(12, 2, Decimal::new(500, 2), 1),
            ],
        );

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, OrderId::new(2));
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[0].merchant_total, Decimal::new(3000, 2));
        assert_eq!(orders[1].merchant_total, Decimal::new(2000, 2));
    }

    #[test]
    fn test_merchant_total_is_net_of_discounts() {
        // 2 x 50.00 at 20% off, plus 1 x 30.00 at full price
        let mut discounted = item(20, 5, Decimal::new(5000, 2), 2);
        discounted.line_discount = Decimal::new(2000, 2);
        let full = item(21, 5, Decimal::new(3000, 2), 1);
        assert_eq!(discounted.line_total(), Decimal::new(8000, 2));

        let orders = assemble_merchant_orders(vec![row(5)], vec![discounted, full]);
        assert_eq!(
            orders.first().map(|o| o.merchant_total),
            Some(Decimal::new(11000, 2))
        );
    }

    #[test]
    fn test_cancel_refunds_paid_orders_only() {
        assert_eq!(
            payment_after(OrderStatus::Cancelled, PaymentStatus::Paid),
            PaymentStatus::Refunded
        );
        assert_eq!(
            payment_after(OrderStatus::Cancelled, PaymentStatus::Pending),
            PaymentStatus::Pending
        );
        assert_eq!(
            payment_after(OrderStatus::Shipped, PaymentStatus::Paid),
            PaymentStatus::Paid
        );
    }
}
