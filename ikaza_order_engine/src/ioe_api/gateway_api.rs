//! Checkout-side logic that sits in front of a [`PaymentGateway`].
//!
//! Cart items are turned into gateway checkout items here: missing names are looked up in the catalogue and variant
//! details (colour, size) are folded into the title the buyer sees on the payment page.
use std::fmt::Debug;

use log::*;

use crate::{
    ioe_api::{errors::CheckoutError, order_objects::CartItem},
    traits::{CheckoutItem, GatewayPayment, GatewayPreference, PaymentGateway, ProductCatalog},
};

/// The title shown on the payment page: the product name, then the colour and size when they are given.
///
/// `checkout_title("Zapatilla X", Some("Azul"), Some("42"))` gives `"Zapatilla X - Color: Azul, Talla: 42"`.
pub fn checkout_title(name: &str, color: Option<&str>, size: Option<&str>) -> String {
    let mut title = name.to_string();
    if let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) {
        title.push_str(&format!(" - Color: {color}"));
    }
    if let Some(size) = size.map(str::trim).filter(|s| !s.is_empty()) {
        title.push_str(&format!(", Talla: {size}"));
    }
    title
}

/// Resolves the display name of a cart item. A non-blank name supplied by the cart is always used as is. Otherwise the
/// catalogue is consulted, and if that fails too, a placeholder naming the product id is returned.
pub async fn resolve_product_name<C: ProductCatalog>(catalog: &C, item: &CartItem) -> String {
    if let Some(name) = item.given_name() {
        return name.to_string();
    }
    let fallback = format!("Producto ID {}", item.product_id);
    match catalog.fetch_product(item.product_id).await {
        Ok(Some(product)) if !product.name.trim().is_empty() => product.name,
        Ok(_) => {
            debug!("💳️ Product {} is not in the catalogue. Using '{fallback}'", item.product_id);
            fallback
        },
        Err(e) => {
            warn!("💳️ Could not look up product {}. Using '{fallback}'. {e}", item.product_id);
            fallback
        },
    }
}

/// The most units of a single product one cart line may hold.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Checks that a cart can be paid for: it must have at least one item, and every item must have a quantity between 1
/// and [`MAX_ITEM_QUANTITY`] and a non-negative price.
pub fn validate_cart(items: &[CartItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::InvalidItems("The cart is empty".into()));
    }
    if let Some(item) = items.iter().find(|i| i.quantity <= 0 || i.quantity > MAX_ITEM_QUANTITY) {
        return Err(CheckoutError::InvalidItems(format!(
            "Product {} has an invalid quantity: {}",
            item.product_id, item.quantity
        )));
    }
    if let Some(item) = items.iter().find(|i| i.unit_price.cents() < 0) {
        return Err(CheckoutError::InvalidItems(format!(
            "Product {} has a negative price: {}",
            item.product_id, item.unit_price
        )));
    }
    Ok(())
}

/// `PaymentGatewayApi` is the engine's entry point to the payment processor. It holds no state besides the gateway and
/// never retries or caches.
pub struct PaymentGatewayApi<G> {
    gateway: G,
}

impl<G> Debug for PaymentGatewayApi<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentGatewayApi")
    }
}

impl<G> PaymentGatewayApi<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G> PaymentGatewayApi<G>
where G: PaymentGateway
{
    /// Converts cart items into checkout items, looking up missing names in `catalog`.
    pub async fn checkout_items<C: ProductCatalog>(
        &self,
        catalog: &C,
        items: &[CartItem],
    ) -> Result<Vec<CheckoutItem>, CheckoutError> {
        validate_cart(items)?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            let name = resolve_product_name(catalog, item).await;
            result.push(CheckoutItem {
                title: checkout_title(&name, item.color.as_deref(), item.size.as_deref()),
                quantity: item.quantity,
                unit_price: item.unit_price,
                sku: item.sku.clone(),
                image_url: item.image_url.clone(),
            });
        }
        Ok(result)
    }

    /// Creates a hosted checkout for `order_id`. Either a preference is returned, or an error; there is no partial
    /// success.
    pub async fn create_preference<C: ProductCatalog>(
        &self,
        catalog: &C,
        items: &[CartItem],
        order_id: i64,
    ) -> Result<GatewayPreference, CheckoutError> {
        let checkout_items = self.checkout_items(catalog, items).await?;
        trace!("💳️ Creating preference for order #{order_id} with {} items", checkout_items.len());
        let preference = self.gateway.create_preference(order_id, &checkout_items).await.map_err(|e| {
            error!("💳️ Could not create a preference for order #{order_id}. {e}");
            CheckoutError::Gateway(e)
        })?;
        info!("💳️ Preference {} created for order #{order_id}", preference.id);
        Ok(preference)
    }

    /// Fetches the gateway's record of a payment. Failures are returned to the caller, never papered over.
    pub async fn query_payment(&self, payment_id: &str) -> Result<GatewayPayment, CheckoutError> {
        let payment_id = payment_id.trim();
        if !is_valid_payment_id(payment_id) {
            return Err(CheckoutError::InvalidPaymentId(payment_id.to_string()));
        }
        let payment = self.gateway.fetch_payment(payment_id).await.map_err(|e| {
            error!("💳️ Could not fetch payment {payment_id}. {e}");
            CheckoutError::Gateway(e)
        })?;
        debug!("💳️ Payment {payment_id} has status {}", payment.status);
        Ok(payment)
    }
}

/// Payment ids end up in a URL path, so only plain identifier characters are accepted.
fn is_valid_payment_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
