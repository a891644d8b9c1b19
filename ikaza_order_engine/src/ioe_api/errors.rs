use thiserror::Error;

use crate::traits::{GatewayError, OrderManagementError};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Invalid checkout items: {0}")]
    InvalidItems(String),
    #[error("Invalid payment id: '{0}'")]
    InvalidPaymentId(String),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    /// Also returned when the order exists but belongs to someone else.
    #[error("Order #{0} was not found")]
    OrderNotFound(i64),
    #[error("Order #{order_id} was already paid with transaction {existing}; payment {attempted} was not applied")]
    TransactionConflict { order_id: i64, existing: String, attempted: String },
    #[error("Payment {payment_id} belongs to order {reference}, not order #{order_id}")]
    PaymentOrderMismatch { order_id: i64, payment_id: String, reference: String },
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    #[error("Checkout failed. {0}")]
    Checkout(#[from] CheckoutError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderManagementError> for OrderFlowError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::OrderNotFound(id) => OrderFlowError::OrderNotFound(id),
            OrderManagementError::EmptyOrder | OrderManagementError::AmountOverflow(_) => {
                OrderFlowError::InvalidOrder(e.to_string())
            },
            OrderManagementError::DatabaseError(s) => OrderFlowError::DatabaseError(s),
        }
    }
}
