use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use ikaza_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::traits::OrderManagementError;

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

//--------------------------------------     UserAccount       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The fulfilment state of an order. The wire and storage names are the Spanish upper-case labels the storefront uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order has been placed but not yet processed by the store.
    #[sqlx(rename = "PENDIENTE")]
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[sqlx(rename = "CONFIRMADO")]
    #[serde(rename = "CONFIRMADO")]
    Confirmed,
    #[sqlx(rename = "ENVIADO")]
    #[serde(rename = "ENVIADO")]
    Shipped,
    #[sqlx(rename = "ENTREGADO")]
    #[serde(rename = "ENTREGADO")]
    Delivered,
    #[sqlx(rename = "CANCELADO")]
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

impl OrderStatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::Pending => "PENDIENTE",
            OrderStatusType::Confirmed => "CONFIRMADO",
            OrderStatusType::Shipped => "ENVIADO",
            OrderStatusType::Delivered => "ENTREGADO",
            OrderStatusType::Cancelled => "CANCELADO",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(Self::Pending),
            "CONFIRMADO" => Ok(Self::Confirmed),
            "ENVIADO" => Ok(Self::Shipped),
            "ENTREGADO" => Ok(Self::Delivered),
            "CANCELADO" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
/// `Pending` is the only non-terminal state. An order reaches `Approved` once the payment processor's own record of
/// the payment says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[sqlx(rename = "PENDIENTE")]
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[sqlx(rename = "APROBADO")]
    #[serde(rename = "APROBADO")]
    Approved,
    #[sqlx(rename = "RECHAZADO")]
    #[serde(rename = "RECHAZADO")]
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDIENTE",
            PaymentStatus::Approved => "APROBADO",
            PaymentStatus::Rejected => "RECHAZADO",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(Self::Pending),
            "APROBADO" => Ok(Self::Approved),
            "RECHAZADO" => Ok(Self::Rejected),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[sqlx(rename = "TRANSFERENCIA_BANCARIA")]
    #[serde(rename = "TRANSFERENCIA_BANCARIA")]
    BankTransfer,
    #[sqlx(rename = "EFECTIVO_CONTRAENTREGA")]
    #[serde(rename = "EFECTIVO_CONTRAENTREGA")]
    CashOnDelivery,
    /// Paid through a Mercado Pago checkout. These orders are only created by the gateway checkout flow.
    #[sqlx(rename = "MERCADO_PAGO")]
    #[serde(rename = "MERCADO_PAGO")]
    MercadoPago,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "TRANSFERENCIA_BANCARIA",
            PaymentMethod::CashOnDelivery => "EFECTIVO_CONTRAENTREGA",
            PaymentMethod::MercadoPago => "MERCADO_PAGO",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRANSFERENCIA_BANCARIA" => Ok(Self::BankTransfer),
            "EFECTIVO_CONTRAENTREGA" => Ok(Self::CashOnDelivery),
            "MERCADO_PAGO" => Ok(Self::MercadoPago),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Order {
    pub id: i64,
    /// Human-readable reference, `PED-YYYYMMDD-NNNNNN`
    pub order_number: String,
    pub user_id: i64,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub total: Money,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// The payment processor's id for the payment that settled this order. Set once, on approval.
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}

//--------------------------------------      OrderItem     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
    pub color: Option<String>,
    pub size: Option<String>,
    pub sku: Option<String>,
}

//--------------------------------------      NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub color: Option<String>,
    pub size: Option<String>,
    pub sku: Option<String>,
}

impl NewOrderItem {
    /// The line total. Fails if it cannot be represented, which only a nonsensical quantity or price can cause.
    pub fn subtotal(&self) -> Result<Money, OrderManagementError> {
        self.unit_price.checked_mul(self.quantity).ok_or_else(|| {
            OrderManagementError::AmountOverflow(format!(
                "{} units of product {} at {}",
                self.quantity, self.product_id, self.unit_price
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub payment_method: PaymentMethod,
    pub shipping_cost: Money,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(user_id: i64, payment_method: PaymentMethod, items: Vec<NewOrderItem>) -> Self {
        Self { user_id, payment_method, shipping_cost: Money::default(), notes: None, items }
    }

    pub fn with_shipping_cost(mut self, shipping_cost: Money) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }

    pub fn with_notes<S: Into<String>>(mut self, notes: S) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn subtotal(&self) -> Result<Money, OrderManagementError> {
        self.items.iter().try_fold(Money::default(), |sum, item| {
            sum.checked_add(item.subtotal()?)
                .ok_or_else(|| OrderManagementError::AmountOverflow("the sum of the line totals".into()))
        })
    }

    pub fn total(&self) -> Result<Money, OrderManagementError> {
        self.subtotal()?
            .checked_add(self.shipping_cost)
            .ok_or_else(|| OrderManagementError::AmountOverflow("the subtotal plus shipping".into()))
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
/// A catalogue entry. The order backend only ever reads these.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub price: Money,
}

//--------------------------------------  PaymentConfirmation  -------------------------------------------------------
/// The outcome of reconciling a gateway payment with a local order.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentConfirmation {
    /// The order was pending and is now approved.
    Confirmed { order_number: String, paid_at: DateTime<Utc> },
    /// The order had already been approved with this very payment. Nothing changed.
    AlreadyConfirmed { order_number: String },
    /// The gateway does not (yet) consider the payment approved. Nothing changed.
    NotApproved { status: String },
}
