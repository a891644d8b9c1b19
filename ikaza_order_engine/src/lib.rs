//! Ikaza Order Engine
//!
//! The order engine holds the core logic of the Ikaza store's order backend. It is provider-agnostic: the payment
//! processor is reached through the [`traits::PaymentGateway`] trait, and storage through the traits in [`traits`].
//!
//! The library is divided into three sections:
//! 1. Storage ([`traits`] and the SQLite backend, [`SqliteDatabase`]). You should never need to access the database
//!    directly. Instead, use the public API. The exception is the data types used in the database. These are defined
//!    in the [`db_types`] module and are public.
//! 2. The payment gateway seam ([`traits::PaymentGateway`]), which the HTTP server implements for Mercado Pago.
//! 3. The public API ([`OrderFlowApi`], [`OrderQueryApi`], [`AccountApi`], [`PaymentGatewayApi`]). This places
//!    orders, starts checkouts, confirms payments and answers order queries.
pub mod db_types;
mod ioe_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use ioe_api::{
    accounts_api::AccountApi,
    errors::{CheckoutError, OrderFlowError},
    gateway_api::{checkout_title, PaymentGatewayApi},
    order_flow_api::OrderFlowApi,
    order_objects,
    order_query_api::OrderQueryApi,
};
