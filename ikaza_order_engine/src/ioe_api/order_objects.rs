use chrono::{DateTime, Utc};
use ikaza_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, OrderItem, OrderStatusType, PaymentMethod, PaymentStatus},
    traits::{GatewayPreference, OrderWithItemCount},
};

//--------------------------------------      CartItem       ---------------------------------------------------------
/// A product line as submitted by the storefront's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "idProducto")]
    pub product_id: i64,
    /// May be blank, in which case the catalogue name is used.
    #[serde(rename = "nombreProducto", default)]
    pub product_name: Option<String>,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Money,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(rename = "imagenUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(rename = "talla", default)]
    pub size: Option<String>,
}

impl CartItem {
    pub fn new(product_id: i64, quantity: i64, unit_price: Money) -> Self {
        Self {
            product_id,
            product_name: None,
            quantity,
            unit_price,
            sku: None,
            image_url: None,
            color: None,
            size: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.product_name = Some(name.into());
        self
    }

    pub fn with_color<S: Into<String>>(mut self, color: S) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_size<S: Into<String>>(mut self, size: S) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_sku<S: Into<String>>(mut self, sku: S) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// The name supplied by the cart, if it is not blank.
    pub fn given_name(&self) -> Option<&str> {
        self.product_name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

//--------------------------------------    OrderRequest     ---------------------------------------------------------
/// Everything needed to place an order on behalf of an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub payment_method: PaymentMethod,
    pub items: Vec<CartItem>,
    pub shipping_cost: Money,
    pub notes: Option<String>,
}

impl OrderRequest {
    pub fn new(payment_method: PaymentMethod, items: Vec<CartItem>) -> Self {
        Self { payment_method, items, shipping_cost: Money::default(), notes: None }
    }

    pub fn with_shipping_cost(mut self, shipping_cost: Money) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }
}

//--------------------------------------   CheckoutSession   ---------------------------------------------------------
/// A freshly created order together with the hosted checkout the buyer must complete to pay for it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub order: Order,
    pub preference: GatewayPreference,
}

//--------------------------------------    OrderSummary     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub success: bool,
    #[serde(rename = "pedidoId")]
    pub order_id: i64,
    #[serde(rename = "numeroPedido")]
    pub order_number: String,
    pub total: Money,
    pub subtotal: Money,
    #[serde(rename = "fechaPedido")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "estado")]
    pub status: OrderStatusType,
    #[serde(rename = "estadoPago")]
    pub payment_status: PaymentStatus,
    #[serde(rename = "metodoPago")]
    pub payment_method: PaymentMethod,
    #[serde(rename = "transaccionId")]
    pub transaction_id: Option<String>,
    /// Number of line items in the order.
    #[serde(rename = "cantidadProductos")]
    pub item_count: i64,
}

impl OrderSummary {
    pub fn new(order: &Order, item_count: i64) -> Self {
        Self {
            success: true,
            order_id: order.id,
            order_number: order.order_number.clone(),
            total: order.total,
            subtotal: order.subtotal,
            created_at: order.created_at,
            status: order.status,
            payment_status: order.payment_status,
            payment_method: order.payment_method,
            transaction_id: order.transaction_id.clone(),
            item_count,
        }
    }
}

impl From<OrderWithItemCount> for OrderSummary {
    fn from(value: OrderWithItemCount) -> Self {
        Self::new(&value.order, value.item_count)
    }
}

//--------------------------------------     OrderDetail     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemView {
    #[serde(rename = "idProducto")]
    pub product_id: i64,
    #[serde(rename = "nombreProducto")]
    pub product_name: String,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "precioUnitario")]
    pub unit_price: Money,
    pub subtotal: Money,
    pub color: Option<String>,
    #[serde(rename = "talla")]
    pub size: Option<String>,
    pub sku: Option<String>,
}

impl From<OrderItem> for OrderItemView {
    fn from(item: OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price: item.unit_price,
            subtotal: item.subtotal,
            color: item.color,
            size: item.size,
            sku: item.sku,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub summary: OrderSummary,
    #[serde(rename = "costoEnvio")]
    pub shipping_cost: Money,
    #[serde(rename = "fechaPago")]
    pub paid_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItemView>,
}

impl OrderDetail {
    pub fn new(order: &Order, items: Vec<OrderItem>) -> Self {
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
        Self {
            summary: OrderSummary::new(order, count),
            shipping_cost: order.shipping_cost,
            paid_at: order.paid_at,
            items: items.into_iter().map(OrderItemView::from).collect(),
        }
    }
}
