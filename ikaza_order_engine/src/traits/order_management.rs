use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderItem};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order #{0} does not exist")]
    OrderNotFound(i64),
    #[error("An order must contain at least one item")]
    EmptyOrder,
    #[error("Amount is too large to be stored: {0}")]
    AmountOverflow(String),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

/// Summary row for order listings: the order plus the number of line items it holds.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OrderWithItemCount {
    #[sqlx(flatten)]
    pub order: Order,
    pub item_count: i64,
}

/// The `OrderManagement` trait defines the storage behaviour of orders.
///
/// Orders are written twice in their lifetime: once when they are created, with all their line items, and once when
/// a payment for them is approved. Nothing is ever deleted.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order and its line items atomically. The backend assigns the id, the order number and the
    /// timestamps; the order starts with both the order and payment status pending.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;

    /// Returns every order owned by `user_id`, newest first.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItemCount>, OrderManagementError>;

    /// Marks the payment for an order as approved, recording the processor's transaction id and the payment time.
    ///
    /// The write only happens while the payment status is still pending. If the order was already approved (or does
    /// not exist), nothing is changed and `None` is returned. Callers can then fetch the order to find out why.
    async fn approve_payment(
        &self,
        order_id: i64,
        transaction_id: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, OrderManagementError>;
}
