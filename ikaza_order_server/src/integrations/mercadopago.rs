//! Mercado Pago as the engine's [`PaymentGateway`].
use ikaza_order_engine::traits::{CheckoutItem, GatewayError, GatewayPayment, GatewayPreference, PaymentGateway};
use log::*;
use mercadopago_tools::{
    BackUrls,
    MercadoPagoApi,
    MercadoPagoApiError,
    MercadoPagoConfig,
    MercadoPagoPayment,
    Preference,
    PreferenceItem,
    PreferenceRequest,
};

#[derive(Clone)]
pub struct MercadoPagoGateway {
    api: MercadoPagoApi,
}

impl MercadoPagoGateway {
    pub fn new(config: MercadoPagoConfig) -> Result<Self, MercadoPagoApiError> {
        let api = MercadoPagoApi::new(config)?;
        Ok(Self { api })
    }

    pub fn config(&self) -> &MercadoPagoConfig {
        self.api.config()
    }

    /// The request body sent to Mercado Pago for `order_id`.
    pub fn preference_request(&self, order_id: i64, items: &[CheckoutItem]) -> PreferenceRequest {
        let config = self.api.config();
        let items = items
            .iter()
            .map(|item| {
                PreferenceItem::new(&item.title, item.quantity, item.unit_price, &config.currency_id)
                    .with_sku(item.sku.as_deref())
                    .with_picture_url(item.image_url.as_deref())
            })
            .collect();
        PreferenceRequest::new(order_id, items, BackUrls::for_order(config, order_id))
    }
}

impl PaymentGateway for MercadoPagoGateway {
    async fn create_preference(
        &self,
        order_id: i64,
        items: &[CheckoutItem],
    ) -> Result<GatewayPreference, GatewayError> {
        let request = self.preference_request(order_id, items);
        let preference = self.api.create_preference(&request).await.map_err(gateway_error)?;
        Ok(gateway_preference(preference))
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let payment = self.api.get_payment(payment_id).await.map_err(gateway_error)?;
        trace!("💳️ Mercado Pago payment record: {payment:?}");
        Ok(gateway_payment(payment))
    }
}

fn gateway_error(e: MercadoPagoApiError) -> GatewayError {
    match e {
        MercadoPagoApiError::Initialization(s)
        | MercadoPagoApiError::RestRequestError(s)
        | MercadoPagoApiError::RestResponseError(s) => GatewayError::Transport(s),
        MercadoPagoApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        MercadoPagoApiError::QueryError { status, message }
        | MercadoPagoApiError::UnexpectedStatus { status, message } => {
            GatewayError::UnexpectedStatus { status, message }
        },
    }
}

fn gateway_preference(p: Preference) -> GatewayPreference {
    GatewayPreference { id: p.id, redirect_url: p.init_point }
}

fn gateway_payment(p: MercadoPagoPayment) -> GatewayPayment {
    GatewayPayment { id: p.id, status: p.status, status_detail: p.status_detail, external_reference: p.external_reference }
}
