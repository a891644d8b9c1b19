use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::MercadoPagoConfig,
    data_objects::{MercadoPagoPayment, Preference, PreferenceRequest},
    MercadoPagoApiError,
};

#[derive(Clone)]
pub struct MercadoPagoApi {
    config: MercadoPagoConfig,
    client: Arc<Client>,
}

impl MercadoPagoApi {
    pub fn new(config: MercadoPagoConfig) -> Result<Self, MercadoPagoApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let mut val = HeaderValue::from_str(&format!("Bearer {}", config.access_token.reveal()))
            .map_err(|e| MercadoPagoApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MercadoPagoApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MercadoPagoConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Sends a JSON request and returns the response status alongside the decoded body. Non-2xx responses are
    /// returned as [`MercadoPagoApiError::QueryError`].
    pub async fn rest_query_with_status<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<(StatusCode, T), MercadoPagoApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_builder() {
                MercadoPagoApiError::RestRequestError(e.to_string())
            } else {
                MercadoPagoApiError::RestResponseError(e.to_string())
            }
        })?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            let result = response.json::<T>().await.map_err(|e| MercadoPagoApiError::JsonError(e.to_string()))?;
            Ok((status, result))
        } else {
            let message = response.text().await.map_err(|e| MercadoPagoApiError::RestResponseError(e.to_string()))?;
            Err(MercadoPagoApiError::QueryError { status: status.as_u16(), message })
        }
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, MercadoPagoApiError> {
        self.rest_query_with_status(method, path, params, body).await.map(|(_, result)| result)
    }

    /// Creates a checkout preference. Mercado Pago signals success with `201 Created`; any other status means that no
    /// preference exists, even if the status is in the 2xx range.
    pub async fn create_preference(&self, request: &PreferenceRequest) -> Result<Preference, MercadoPagoApiError> {
        debug!(
            "💳️ Creating preference for order {} with {} items",
            request.external_reference,
            request.items.len()
        );
        debug!("💳️ Preference payload: {}", serde_json::to_string(request).unwrap_or_default());
        let (status, value) =
            self.rest_query_with_status::<Value, &PreferenceRequest>(Method::POST, "/checkout/preferences", &[], Some(request))
                .await?;
        if status != StatusCode::CREATED {
            error!("💳️ Mercado Pago did not create the preference. Status {status}. Response: {value}");
            return Err(MercadoPagoApiError::UnexpectedStatus { status: status.as_u16(), message: value.to_string() });
        }
        let preference: Preference =
            serde_json::from_value(value).map_err(|e| MercadoPagoApiError::JsonError(e.to_string()))?;
        info!("💳️ Preference {} created. Checkout URL: {}", preference.id, preference.init_point);
        Ok(preference)
    }

    /// Fetches the full payment record for the given payment id.
    pub async fn get_payment(&self, payment_id: &str) -> Result<MercadoPagoPayment, MercadoPagoApiError> {
        let path = format!("/v1/payments/{payment_id}");
        debug!("💳️ Fetching payment {payment_id}");
        let payment = self.rest_query::<MercadoPagoPayment, ()>(Method::GET, &path, &[], None).await?;
        info!("💳️ Payment {payment_id} has status '{}'", payment.status);
        Ok(payment)
    }
}
