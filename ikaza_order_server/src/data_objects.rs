use std::fmt::Display;

use chrono::{DateTime, Utc};
use ikaza_common::Money;
use ikaza_order_engine::{
    db_types::{Order, OrderStatusType, PaymentConfirmation, PaymentMethod, PaymentStatus},
    order_objects::{CartItem, CheckoutSession, OrderRequest},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

//--------------------------------------   Order requests    ---------------------------------------------------------
/// The storefront's checkout payload. It is used for both `/orders` and `/checkout/mercadopago`; the latter ignores
/// `metodoPago`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Optional. When present it must match the caller.
    #[serde(rename = "idUsuario", default)]
    pub user_id: Option<i64>,
    #[serde(rename = "metodoPago", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "cartItems", alias = "items", default)]
    pub items: Vec<CartItem>,
    #[serde(rename = "costoEnvio", default)]
    pub shipping_cost: Option<Money>,
    /// Free text: delivery address and any instructions for the store.
    #[serde(rename = "notas", alias = "direccionEnvio", default)]
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn into_order_request(self, payment_method: PaymentMethod) -> OrderRequest {
        let mut request =
            OrderRequest::new(payment_method, self.items).with_shipping_cost(self.shipping_cost.unwrap_or_default());
        request.notes = self.notes.filter(|n| !n.trim().is_empty());
        request
    }
}

/// Sent by the storefront when the buyer returns from the Mercado Pago checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Mercado Pago sends ids as numbers, storefronts usually as strings. Anything else is treated as missing so that
    /// the caller gets a confirmation failure rather than a bare 400.
    #[serde(rename = "paymentId", default, deserialize_with = "string_or_number")]
    pub payment_id: Option<String>,
    /// The status Mercado Pago put in the return URL. Informational only; the gateway is always asked directly.
    #[serde(default)]
    pub status: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//--------------------------------------   OrderResponse     ---------------------------------------------------------
/// The reply to order creation and to gateway checkouts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub mensaje: String,
    #[serde(rename = "pedidoId")]
    pub order_id: Option<i64>,
    #[serde(rename = "numeroPedido")]
    pub order_number: Option<String>,
    pub total: Option<Money>,
    pub subtotal: Option<Money>,
    #[serde(rename = "fechaPedido")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "estado")]
    pub status: Option<OrderStatusType>,
    #[serde(rename = "estadoPago")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(rename = "metodoPago")]
    pub payment_method: Option<PaymentMethod>,
    /// The preference id for gateway checkouts.
    #[serde(rename = "transaccionId")]
    pub transaction_id: Option<String>,
    #[serde(rename = "redirectionUrl")]
    pub redirection_url: Option<String>,
    #[serde(rename = "requiresRedirection")]
    pub requires_redirection: bool,
    #[serde(rename = "cantidadProductos")]
    pub item_count: usize,
}

impl OrderResponse {
    pub fn for_order<S: Display>(order: &Order, item_count: usize, message: S) -> Self {
        Self {
            success: true,
            mensaje: message.to_string(),
            order_id: Some(order.id),
            order_number: Some(order.order_number.clone()),
            total: Some(order.total),
            subtotal: Some(order.subtotal),
            created_at: Some(order.created_at),
            status: Some(order.status),
            payment_status: Some(order.payment_status),
            payment_method: Some(order.payment_method),
            transaction_id: order.transaction_id.clone(),
            redirection_url: None,
            requires_redirection: false,
            item_count,
        }
    }

    pub fn for_checkout<S: Display>(session: &CheckoutSession, item_count: usize, message: S) -> Self {
        Self {
            transaction_id: Some(session.preference.id.clone()),
            redirection_url: Some(session.preference.redirect_url.clone()),
            requires_redirection: true,
            ..Self::for_order(&session.order, item_count, message)
        }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, mensaje: message.to_string(), ..Default::default() }
    }
}

//-------------------------------------- ConfirmPaymentResponse ------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    #[serde(rename = "numeroPedido")]
    pub order_number: Option<String>,
    pub mensaje: String,
}

impl ConfirmPaymentResponse {
    pub fn success<S: Display>(order_number: String, message: S) -> Self {
        Self { success: true, order_number: Some(order_number), mensaje: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, order_number: None, mensaje: message.to_string() }
    }
}

impl From<PaymentConfirmation> for ConfirmPaymentResponse {
    fn from(value: PaymentConfirmation) -> Self {
        match value {
            PaymentConfirmation::Confirmed { order_number, .. } => {
                Self::success(order_number, "Pago confirmado exitosamente")
            },
            PaymentConfirmation::AlreadyConfirmed { order_number } => {
                Self::success(order_number, "El pago ya había sido confirmado")
            },
            PaymentConfirmation::NotApproved { status } => {
                Self::failure(format!("El pago no está aprobado en Mercado Pago. Estado: {status}"))
            },
        }
    }
}
