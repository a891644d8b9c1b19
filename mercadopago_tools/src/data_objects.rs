use ikaza_common::Money;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::MercadoPagoConfig;

/// The payment status Mercado Pago reports once funds have been captured.
pub const STATUS_APPROVED: &str = "approved";
/// Tag appended to every redirect URL so the storefront knows which payment flow the buyer is returning from.
pub const PAYMENT_METHOD_TAG: &str = "mercadopago";

//--------------------------------------   PreferenceItem    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: i64,
    /// Mercado Pago only accepts plain numbers here.
    pub unit_price: f64,
    pub currency_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_url: Option<String>,
}

impl PreferenceItem {
    pub fn new<S: Into<String>>(title: S, quantity: i64, unit_price: Money, currency_id: &str) -> Self {
        Self {
            title: title.into(),
            quantity,
            unit_price: unit_price.to_major_units_f64(),
            currency_id: currency_id.to_string(),
            description: None,
            picture_url: None,
        }
    }

    pub fn with_sku(mut self, sku: Option<&str>) -> Self {
        self.description = sku.map(|s| format!("SKU: {s}"));
        self
    }

    pub fn with_picture_url(mut self, url: Option<&str>) -> Self {
        self.picture_url = url.filter(|u| !u.trim().is_empty()).map(str::to_string);
        self
    }
}

//--------------------------------------      BackUrls       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

impl BackUrls {
    /// Builds the three redirect URLs for an order, e.g. `https://shop/ok?method=mercadopago&pedidoId=7`
    pub fn for_order(config: &MercadoPagoConfig, order_id: i64) -> Self {
        let url = |base: &str| {
            let separator = if base.contains('?') { '&' } else { '?' };
            format!("{base}{separator}method={PAYMENT_METHOD_TAG}&pedidoId={order_id}")
        };
        Self { success: url(&config.success_url), failure: url(&config.failure_url), pending: url(&config.pending_url) }
    }
}

//--------------------------------------  PreferenceRequest  ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceMetadata {
    pub pedido_id: String,
}

/// The body of `POST /checkout/preferences`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub back_urls: BackUrls,
    /// Correlates the preference (and every payment made against it) with our order id.
    pub external_reference: String,
    pub metadata: PreferenceMetadata,
}

impl PreferenceRequest {
    pub fn new(order_id: i64, items: Vec<PreferenceItem>, back_urls: BackUrls) -> Self {
        Self {
            items,
            back_urls,
            external_reference: order_id.to_string(),
            metadata: PreferenceMetadata { pedido_id: order_id.to_string() },
        }
    }
}

//--------------------------------------     Preference      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub id: String,
    /// The checkout URL the buyer must be redirected to.
    pub init_point: String,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
}

//--------------------------------------  MercadoPagoPayment ---------------------------------------------------------
/// A payment record as returned by `GET /v1/payments/{id}`. Only the fields this system reads are typed; the rest of
/// the record is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MercadoPagoPayment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default)]
    pub transaction_amount: Option<f64>,
    #[serde(default)]
    pub currency_id: Option<String>,
    #[serde(default)]
    pub date_approved: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MercadoPagoPayment {
    pub fn is_approved(&self) -> bool {
        self.status == STATUS_APPROVED
    }
}

/// Mercado Pago payment ids are numbers in JSON, but buyers hand them to us as strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where D: Deserializer<'de> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        v => Err(serde::de::Error::custom(format!("expected a string or number id, got {v}"))),
    }
}
