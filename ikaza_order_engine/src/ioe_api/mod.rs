//! # Ikaza order engine public API
//!
//! The `ioe_api` module exposes the programmatic API of the order engine. The API is modular, so that clients can pick
//! the functionality they need.
//!
//! * [`accounts_api`] resolves callers to user accounts.
//! * [`order_flow_api`] creates orders, starts gateway checkouts and reconciles gateway payments with orders.
//! * [`order_query_api`] provides the read-only order views a customer is allowed to see.
//! * [`gateway_api`] turns cart items into gateway checkout items and wraps the [`crate::traits::PaymentGateway`].
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits the API needs:
//!
//! ```rust,ignore
//! use ikaza_order_engine::{OrderQueryApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements OrderManagement
//! let api = OrderQueryApi::new(db);
//! let orders = api.orders_for_user(user_id).await?;
//! ```
pub mod accounts_api;
pub mod errors;
pub mod gateway_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod order_query_api;
