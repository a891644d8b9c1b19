//! # Ikaza order server
//! The HTTP surface of the Ikaza order backend. It is responsible for:
//! * Verifying the caller's access token and resolving it to a user account.
//! * Placing bank transfer and cash-on-delivery orders.
//! * Starting Mercado Pago checkouts, and confirming the payments buyers make there.
//! * Answering order history queries.
//!
//! The business rules live in `ikaza_order_engine`. This crate wires the engine to actix-web, SQLite and Mercado Pago.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `POST /api/orders`: Place an order.
//! * `GET /api/orders/mine`: The caller's orders.
//! * `GET /api/orders/{order_id}`: One of the caller's orders, with its items.
//! * `POST /api/orders/{order_id}/confirm-payment`: Confirm a Mercado Pago payment.
//! * `POST /api/checkout/mercadopago`: Place a Mercado Pago order and get its checkout URL.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
