use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, PaymentStatus},
    traits::{OrderManagementError, OrderWithItemCount},
};

/// The human-readable order reference, e.g. `PED-20240615-000042`.
pub fn order_number(id: i64, created_at: DateTime<Utc>) -> String {
    format!("PED-{}-{id:06}", created_at.format("%Y%m%d"))
}

/// Inserts a new order and its line items using the given connection. This is not atomic. Embed this call inside a
/// transaction and pass `&mut *tx` as the connection argument so that an order is never stored without its items.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderManagementError> {
    if order.items.is_empty() {
        return Err(OrderManagementError::EmptyOrder);
    }
    let now = Utc::now();
    let subtotal = order.subtotal()?;
    let total = order.total()?;
    // The order number is derived from the row id, so a unique placeholder holds the slot until the id is known.
    let placeholder = format!("PED-NEW-{}", rand::random::<u64>());
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                order_number,
                user_id,
                subtotal,
                shipping_cost,
                total,
                payment_method,
                notes,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id;
        "#,
    )
    .bind(placeholder)
    .bind(order.user_id)
    .bind(subtotal)
    .bind(order.shipping_cost)
    .bind(total)
    .bind(order.payment_method)
    .bind(order.notes)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;
    let number = order_number(id, now);
    let inserted: Order = sqlx::query_as("UPDATE orders SET order_number = $1 WHERE id = $2 RETURNING *")
        .bind(&number)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    for item in order.items {
        insert_order_item(id, item, conn).await?;
    }
    debug!("🗃️ Order {number} inserted with id {id}. Total: {total}");
    Ok(inserted)
}

async fn insert_order_item(
    order_id: i64,
    item: NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<(), OrderManagementError> {
    let subtotal = item.subtotal()?;
    sqlx::query(
        r#"
            INSERT INTO order_items (
                order_id,
                product_id,
                product_name,
                quantity,
                unit_price,
                subtotal,
                color,
                size,
                sku
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .bind(subtotal)
    .bind(item.color)
    .bind(item.size)
    .bind(item.sku)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_order_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches all orders for the user, newest first, along with the number of line items in each.
pub async fn fetch_orders_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderWithItemCount>, sqlx::Error> {
    let orders: Vec<OrderWithItemCount> = sqlx::query_as(
        r#"
        SELECT orders.*,
            (SELECT COUNT(*) FROM order_items WHERE order_items.order_id = orders.id) AS item_count
        FROM orders
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    trace!("🗃️ Fetched {} orders for user #{user_id}", orders.len());
    Ok(orders)
}

/// Sets the payment status to approved, but only if it is still pending. Returns the updated order, or `None` if no
/// pending order with this id exists.
pub async fn approve_payment(
    id: i64,
    transaction_id: &str,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
        UPDATE orders SET
            payment_status = $1,
            transaction_id = $2,
            paid_at = $3,
            updated_at = $3
        WHERE id = $4 AND payment_status = $5
        RETURNING *
        "#,
    )
    .bind(PaymentStatus::Approved)
    .bind(transaction_id)
    .bind(paid_at)
    .bind(id)
    .bind(PaymentStatus::Pending)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}
