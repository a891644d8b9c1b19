use std::time::Duration;

use ikaza_common::{Secret, CURRENCY_CODE};
use log::*;

pub const DEFAULT_API_URL: &str = "https://api.mercadopago.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the Mercado Pago client needs. It is built once at start-up and handed to [`crate::MercadoPagoApi`].
#[derive(Debug, Clone)]
pub struct MercadoPagoConfig {
    /// Base URL of the REST API, without a trailing slash. Overridable so that tests can point at a stub server.
    pub api_url: String,
    pub access_token: Secret<String>,
    /// Where the buyer lands after an approved payment. The order id is appended as a query parameter.
    pub success_url: String,
    pub failure_url: String,
    pub pending_url: String,
    pub currency_id: String,
    /// Upper bound for every outbound request, connection included.
    pub timeout: Duration,
}

impl Default for MercadoPagoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_token: Secret::default(),
            success_url: "http://localhost:4200/checkout/success".to_string(),
            failure_url: "http://localhost:4200/checkout/failure".to_string(),
            pending_url: "http://localhost:4200/checkout/pending".to_string(),
            currency_id: CURRENCY_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MercadoPagoConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let api_url = std::env::var("IKZ_MP_API_URL").unwrap_or_else(|_| {
            info!("IKZ_MP_API_URL not set, using {DEFAULT_API_URL}");
            defaults.api_url.clone()
        });
        let access_token = Secret::new(std::env::var("IKZ_MP_ACCESS_TOKEN").unwrap_or_else(|_| {
            warn!("IKZ_MP_ACCESS_TOKEN not set. Every call to Mercado Pago will be rejected.");
            String::default()
        }));
        let success_url = std::env::var("IKZ_MP_SUCCESS_URL").unwrap_or_else(|_| {
            warn!("IKZ_MP_SUCCESS_URL not set, using {}", defaults.success_url);
            defaults.success_url.clone()
        });
        let failure_url = std::env::var("IKZ_MP_FAILURE_URL").unwrap_or_else(|_| {
            warn!("IKZ_MP_FAILURE_URL not set, using {}", defaults.failure_url);
            defaults.failure_url.clone()
        });
        let pending_url = std::env::var("IKZ_MP_PENDING_URL").unwrap_or_else(|_| {
            warn!("IKZ_MP_PENDING_URL not set, using {}", defaults.pending_url);
            defaults.pending_url.clone()
        });
        let currency_id = std::env::var("IKZ_MP_CURRENCY").unwrap_or_else(|_| defaults.currency_id.clone());
        let timeout = std::env::var("IKZ_MP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("Invalid value for IKZ_MP_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token,
            success_url,
            failure_url,
            pending_url,
            currency_id,
            timeout,
        }
    }
}
