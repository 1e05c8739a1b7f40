//! Order repository: order history and the checkout write path.
//!
//! The checkout functions take a connection so the caller can run them inside
//! one transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use luxora_core::order::timeline;
use luxora_core::pagination::{Page, Paginated};
use luxora_core::pricing::{CartTotals, PricedLine};
use luxora_core::{
    CartItemId, MerchantId, OrderId, OrderStatus, PaymentMethodId, PaymentStatus, ProductId,
    UserId,
};

use super::RepositoryError;
use crate::models::{Address, OrderDetail, OrderLine, OrderSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    subtotal: Decimal,
    discount: Decimal,
    tax: Decimal,
    shipping: Decimal,
    total: Decimal,
    shipping_address: Json<Address>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_detail(self, items: Vec<OrderLine>) -> OrderDetail {
        OrderDetail {
            timeline: timeline(self.status, self.created_at, self.updated_at),
            id: self.id,
            order_number: self.order_number,
            status: self.status,
            payment_status: self.payment_status,
            subtotal: self.subtotal,
            discount: self.discount,
            tax: self.tax,
            shipping: self.shipping,
            total: self.total,
            shipping_address: self.shipping_address.0,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A cart line locked for checkout, with the product state at lock time.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckoutLine {
    pub cart_item_id: CartItemId,
    pub product_id: ProductId,
    pub merchant_id: MerchantId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub discount_percent: i32,
    pub quantity: i32,
    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub stock: i32,
    /// Product and merchant are both `ACTIVE`.
    pub available: bool,
}

impl CheckoutLine {
    /// The line as priced on the order.
    #[must_use]
    pub const fn priced(&self) -> PricedLine {
        PricedLine::new(self.unit_price, self.quantity, self.discount_percent)
    }
}

/// Values for a new order row.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub order_number: &'a str,
    pub user_id: UserId,
    pub payment_status: PaymentStatus,
    pub totals: &'a CartTotals,
    pub shipping_address: &'a Address,
    pub payment_method_id: Option<PaymentMethodId>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for a shopper's orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
        page: Page,
    ) -> Result<Paginated<OrderSummary>, RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM luxora.orders WHERE user_id = $1")
            .bind(user)
            .fetch_one(self.pool)
            .await?;

        let orders = sqlx::query_as::<_, OrderSummary>(
            r"
            SELECT o.id, o.order_number, o.status, o.payment_status, o.total, o.created_at,
                   COALESCE((SELECT SUM(quantity) FROM luxora.order_items WHERE order_id = o.id), 0)::bigint
                       AS item_count
            FROM luxora.orders o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC, o.id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        Ok(Paginated::new(orders, page, total))
    }

    /// One of the user's orders by order number, with items and timeline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user: UserId,
        order_number: &str,
    ) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, order_number, status, payment_status, subtotal, discount, tax,
                   shipping, total, shipping_address, created_at, updated_at
            FROM luxora.orders
            WHERE user_id = $1 AND order_number = $2
            ",
        )
        .bind(user)
        .bind(order_number)
        .fetch_optional(self.pool)
        .await?
        else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderLine>(
            r"
            SELECT oi.id, oi.product_id, oi.product_name, p.slug AS product_slug,
                   p.images[1] AS image, oi.merchant_id, m.name AS merchant_name,
                   oi.unit_price, oi.quantity, oi.line_discount, oi.selected_color,
                   oi.selected_size
            FROM luxora.order_items oi
            JOIN luxora.products p ON p.id = oi.product_id
            JOIN luxora.merchants m ON m.id = oi.merchant_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            ",
        )
        .bind(row.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(row.into_detail(items)))
    }
}

// =============================================================================
// Checkout (transactional)
// =============================================================================

/// Lock the user's cart lines and their products for checkout.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_cart_lines(
    conn: &mut PgConnection,
    user: UserId,
) -> Result<Vec<CheckoutLine>, RepositoryError> {
    let lines = sqlx::query_as::<_, CheckoutLine>(
        r"
        SELECT ci.id AS cart_item_id, p.id AS product_id, p.merchant_id,
               p.name AS product_name, p.price AS unit_price, p.discount_percent,
               ci.quantity, ci.selected_color, ci.selected_size, p.stock,
               (p.status = 'ACTIVE' AND m.status = 'ACTIVE') AS available
        FROM luxora.cart_items ci
        JOIN luxora.products p ON p.id = ci.product_id
        JOIN luxora.merchants m ON m.id = p.merchant_id
        WHERE ci.user_id = $1
        ORDER BY p.id
        FOR UPDATE OF p, ci
        ",
    )
    .bind(user)
    .fetch_all(&mut *conn)
    .await?;

    Ok(lines)
}

/// Whether a payment method belongs to the user.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn owns_payment_method(
    conn: &mut PgConnection,
    user: UserId,
    method: PaymentMethodId,
) -> Result<bool, RepositoryError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM luxora.payment_methods WHERE id = $1 AND user_id = $2)",
    )
    .bind(method)
    .bind(user)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// The user's default payment method, if any.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn default_payment_method(
    conn: &mut PgConnection,
    user: UserId,
) -> Result<Option<PaymentMethodId>, RepositoryError> {
    let id = sqlx::query_scalar::<_, PaymentMethodId>(
        "SELECT id FROM luxora.payment_methods WHERE user_id = $1 AND is_default",
    )
    .bind(user)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id)
}

/// Insert the order row. Returns `None` if the order number is already
/// taken, leaving the transaction usable for a retry.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder<'_>,
) -> Result<Option<OrderId>, RepositoryError> {
    let id = sqlx::query_scalar::<_, OrderId>(
        r"
        INSERT INTO luxora.orders
            (order_number, user_id, status, payment_status, subtotal, discount, tax,
             shipping, total, shipping_address, payment_method_id)
        VALUES ($1, $2, 'PENDING', $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (order_number) DO NOTHING
        RETURNING id
        ",
    )
    .bind(order.order_number)
    .bind(order.user_id)
    .bind(order.payment_status)
    .bind(order.totals.subtotal)
    .bind(order.totals.discount)
    .bind(order.totals.tax)
    .bind(order.totals.shipping)
    .bind(order.totals.total)
    .bind(Json(order.shipping_address))
    .bind(order.payment_method_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(id)
}

/// Insert an order line, with its share of the discount, and take its
/// units out of stock.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn insert_item(
    conn: &mut PgConnection,
    order: OrderId,
    line: &CheckoutLine,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO luxora.order_items
            (order_id, product_id, merchant_id, product_name, unit_price, quantity,
             line_discount, selected_color, selected_size)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(order)
    .bind(line.product_id)
    .bind(line.merchant_id)
    .bind(&line.product_name)
    .bind(line.unit_price)
    .bind(line.quantity)
    .bind(line.priced().discount())
    .bind(line.selected_color.as_deref())
    .bind(line.selected_size.as_deref())
    .execute(&mut *conn)
    .await?;

    sqlx::query("UPDATE luxora.products SET stock = stock - $2 WHERE id = $1")
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Delete the purchased cart lines.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_cart_lines(
    conn: &mut PgConnection,
    user: UserId,
    items: &[CartItemId],
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM luxora.cart_items WHERE user_id = $1 AND id = ANY($2)")
        .bind(user)
        .bind(items)
        .execute(&mut *conn)
        .await?;

    Ok(())
}
