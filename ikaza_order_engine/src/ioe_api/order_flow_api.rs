use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, PaymentConfirmation, PaymentMethod},
    ioe_api::{
        errors::OrderFlowError,
        gateway_api::{resolve_product_name, validate_cart, PaymentGatewayApi},
        order_objects::{CheckoutSession, OrderRequest},
    },
    traits::{OrderManagement, PaymentGateway, ProductCatalog},
};

/// `OrderFlowApi` is the primary API for the order and payment flows: placing orders, starting hosted checkouts and
/// confirming payments reported back by the buyer's browser.
pub struct OrderFlowApi<B, G> {
    db: B,
    payments: PaymentGatewayApi<G>,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, payments: PaymentGatewayApi::new(gateway) }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: OrderManagement + ProductCatalog,
    G: PaymentGateway,
{
    /// Places a new order for `user_id`.
    ///
    /// Line item names are resolved the same way as for gateway checkouts. The subtotal is the sum of the line
    /// totals, and the total adds the shipping cost. The order and its items are stored in one transaction, with the
    /// order and payment status both pending.
    pub async fn create_order(&self, user_id: i64, request: OrderRequest) -> Result<Order, OrderFlowError> {
        validate_cart(&request.items).map_err(|e| OrderFlowError::InvalidOrder(e.to_string()))?;
        if request.shipping_cost.cents() < 0 {
            return Err(OrderFlowError::InvalidOrder(format!("Invalid shipping cost: {}", request.shipping_cost)));
        }
        let mut items = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product_name = resolve_product_name(&self.db, item).await;
            items.push(NewOrderItem {
                product_id: item.product_id,
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                color: item.color.clone(),
                size: item.size.clone(),
                sku: item.sku.clone(),
            });
        }
        let mut order = NewOrder::new(user_id, request.payment_method, items).with_shipping_cost(request.shipping_cost);
        order.notes = request.notes;
        order.total()?;
        let order = self.db.insert_order(order).await?;
        info!(
            "🔄️📦️ Order {} created for user #{user_id}. Total {} via {}",
            order.order_number, order.total, order.payment_method
        );
        Ok(order)
    }

    /// Places a Mercado Pago order and creates the hosted checkout the buyer must complete.
    ///
    /// The payment method in `request` is ignored. If the gateway refuses the checkout, the order stays pending (it
    /// can never be paid) and the gateway error is returned.
    pub async fn start_gateway_checkout(
        &self,
        user_id: i64,
        request: OrderRequest,
    ) -> Result<CheckoutSession, OrderFlowError> {
        let items = request.items.clone();
        let request = OrderRequest { payment_method: PaymentMethod::MercadoPago, ..request };
        let order = self.create_order(user_id, request).await?;
        let preference = match self.payments.create_preference(&self.db, &items, order.id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    "🔄️💳️ Order {} was created, but its checkout could not be started. It will remain pending. {e}",
                    order.order_number
                );
                return Err(e.into());
            },
        };
        debug!("🔄️💳️ Checkout for order {} is ready at {}", order.order_number, preference.redirect_url);
        Ok(CheckoutSession { order, preference })
    }

    /// Reconciles the gateway's record of `payment_id` with the order `order_id` owned by `user_id`.
    ///
    /// * The order must exist and belong to `user_id`. Otherwise [`OrderFlowError::OrderNotFound`] is returned, so
    ///   callers cannot probe for other users' orders.
    /// * The gateway is queried exactly once. Its answer is the only evidence of payment that is trusted.
    /// * A payment made against a different order is rejected with [`OrderFlowError::PaymentOrderMismatch`].
    /// * A payment that is not approved leaves the order untouched and yields [`PaymentConfirmation::NotApproved`].
    /// * An approved payment is written only if the order's payment is still pending. Replaying the same payment is a
    ///   no-op ([`PaymentConfirmation::AlreadyConfirmed`]); a different payment for an already paid order is a
    ///   [`OrderFlowError::TransactionConflict`] and the original transaction id is kept.
    pub async fn confirm_payment(
        &self,
        order_id: i64,
        payment_id: &str,
        user_id: i64,
    ) -> Result<PaymentConfirmation, OrderFlowError> {
        let payment_id = payment_id.trim();
        trace!("🔄️✅️ Confirming payment {payment_id} for order #{order_id}");
        let order = self.owned_order(order_id, user_id).await?;
        let payment = self.payments.query_payment(payment_id).await?;
        if let Some(reference) = payment.external_reference.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            if reference != order_id.to_string() {
                warn!(
                    "🔄️✅️ Payment {payment_id} was made against order {reference}, but was presented for order \
                     #{order_id}. Rejecting."
                );
                return Err(OrderFlowError::PaymentOrderMismatch {
                    order_id,
                    payment_id: payment_id.to_string(),
                    reference: reference.to_string(),
                });
            }
        }
        if !payment.is_approved() {
            warn!(
                "🔄️✅️ Payment {payment_id} for order #{order_id} is not approved. Gateway status: {} ({}). The \
                 order is unchanged.",
                payment.status,
                payment.status_detail.as_deref().unwrap_or("no detail")
            );
            return Ok(PaymentConfirmation::NotApproved { status: payment.status });
        }
        let paid_at = Utc::now();
        match self.db.approve_payment(order_id, payment_id, paid_at).await? {
            Some(updated) => {
                info!("🔄️✅️ Order {} is paid. Transaction {payment_id}", updated.order_number);
                let paid_at = updated.paid_at.unwrap_or(paid_at);
                Ok(PaymentConfirmation::Confirmed { order_number: updated.order_number, paid_at })
            },
            None => self.resolve_unapplied_approval(order, payment_id).await,
        }
    }

    async fn owned_order(&self, order_id: i64, user_id: i64) -> Result<Order, OrderFlowError> {
        match self.db.fetch_order(order_id).await? {
            Some(order) if order.is_owned_by(user_id) => Ok(order),
            Some(_) => {
                warn!("🔄️ User #{user_id} asked for order #{order_id}, which belongs to someone else");
                Err(OrderFlowError::OrderNotFound(order_id))
            },
            None => Err(OrderFlowError::OrderNotFound(order_id)),
        }
    }

    /// The approval write was skipped because the order's payment was no longer pending. Work out whether this is a
    /// harmless replay or a second payment for the same order.
    async fn resolve_unapplied_approval(
        &self,
        order: Order,
        payment_id: &str,
    ) -> Result<PaymentConfirmation, OrderFlowError> {
        // Re-read, since the order may have been approved concurrently after it was first loaded.
        let current = self.db.fetch_order(order.id).await?.unwrap_or(order);
        match current.transaction_id.as_deref() {
            Some(existing) if existing == payment_id => {
                debug!("🔄️✅️ Order {} was already confirmed with payment {payment_id}", current.order_number);
                Ok(PaymentConfirmation::AlreadyConfirmed { order_number: current.order_number })
            },
            existing => {
                let existing = existing.unwrap_or_default().to_string();
                error!(
                    "🔄️✅️ Order {} is already {} with transaction '{existing}'. Payment {payment_id} was NOT \
                     applied. Check whether the buyer has been charged twice.",
                    current.order_number, current.payment_status
                );
                Err(OrderFlowError::TransactionConflict {
                    order_id: current.id,
                    existing,
                    attempted: payment_id.to_string(),
                })
            },
        }
    }
}
