//! Read-only order views for customers. A customer can only ever see their own orders; asking for someone else's order
//! looks exactly like asking for one that does not exist.
use std::fmt::Debug;

use log::*;

use crate::{
    ioe_api::{
        errors::OrderFlowError,
        order_objects::{OrderDetail, OrderSummary},
    },
    traits::OrderManagement,
};

pub struct OrderQueryApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi ({:?})", self.db)
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// The full order, including its line items, if `user_id` owns it.
    pub async fn order_detail(&self, order_id: i64, user_id: i64) -> Result<OrderDetail, OrderFlowError> {
        let order = match self.db.fetch_order(order_id).await? {
            Some(order) if order.is_owned_by(user_id) => order,
            Some(_) => {
                warn!("🔄️ User #{user_id} asked for order #{order_id}, which belongs to someone else");
                return Err(OrderFlowError::OrderNotFound(order_id));
            },
            None => return Err(OrderFlowError::OrderNotFound(order_id)),
        };
        let items = self.db.fetch_order_items(order_id).await?;
        trace!("🔄️ Order {} has {} items", order.order_number, items.len());
        Ok(OrderDetail::new(&order, items))
    }

    /// Every order placed by `user_id`, newest first. No pagination.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<OrderSummary>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        debug!("🔄️ User #{user_id} has {} orders", orders.len());
        Ok(orders.into_iter().map(OrderSummary::from).collect())
    }
}
