use serde::{Deserialize, Serialize};
use thiserror::Error;

use ikaza_common::Money;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request never produced a usable response: connection failure, timeout, or a rejected request.
    #[error("Could not reach the payment gateway: {0}")]
    Transport(String),
    #[error("The payment gateway answered with status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },
    #[error("The payment gateway sent a response that could not be understood: {0}")]
    InvalidResponse(String),
}

/// A single line of a checkout, ready to be shown to the buyer on the gateway's payment page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub title: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub sku: Option<String>,
    pub image_url: Option<String>,
}

/// A hosted checkout created by the gateway for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPreference {
    pub id: String,
    /// Where the buyer must be sent to pay.
    pub redirect_url: String,
}

/// The gateway's own record of a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub status: String,
    pub status_detail: Option<String>,
    /// The order id the payment was made against, as sent when the preference was created.
    pub external_reference: Option<String>,
}

impl GatewayPayment {
    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Creates a hosted checkout for `order_id` containing `items`.
    async fn create_preference(&self, order_id: i64, items: &[CheckoutItem])
        -> Result<GatewayPreference, GatewayError>;

    /// Fetches the gateway's current record of the payment with the given id.
    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}
