//! A thin client for the parts of the Mercado Pago REST API that the Ikaza order backend uses: creating checkout
//! preferences and looking up payments.
//!
//! The client is a pass-through translator. It does not retry, cache or reconcile anything; callers decide what a
//! failure means for their own state.
mod api;
mod config;
mod error;

pub mod data_objects;

pub use api::MercadoPagoApi;
pub use config::MercadoPagoConfig;
pub use data_objects::{
    BackUrls,
    MercadoPagoPayment,
    Preference,
    PreferenceItem,
    PreferenceMetadata,
    PreferenceRequest,
    PAYMENT_METHOD_TAG,
    STATUS_APPROVED,
};
pub use error::MercadoPagoApiError;
