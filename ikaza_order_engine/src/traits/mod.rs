//! # Storage and gateway interfaces
//!
//! This module defines the contracts that backends must satisfy in order to be driven by the order engine APIs.
//!
//! * [`OrderManagement`] stores and retrieves orders and their line items, and applies the single payment approval
//!   write an order ever receives.
//! * [`AccountManagement`] resolves the authenticated caller's e-mail address to a user account.
//! * [`ProductCatalog`] is a read-only view of the catalogue, used to name checkout items.
//! * [`PaymentGateway`] is the provider-agnostic seam to the payment processor. The HTTP server supplies the
//!   Mercado Pago implementation.
//!
//! [`OrderDatabase`] bundles the three storage traits for callers that need the whole store.
mod account_management;
mod order_management;
mod payment_gateway;
mod product_catalog;

pub use account_management::{AccountApiError, AccountManagement};
pub use order_management::{OrderManagement, OrderManagementError, OrderWithItemCount};
pub use payment_gateway::{CheckoutItem, GatewayError, GatewayPayment, GatewayPreference, PaymentGateway};
pub use product_catalog::{CatalogError, ProductCatalog};

/// Everything the order routes need from a storage backend.
pub trait OrderDatabase: OrderManagement + AccountManagement + ProductCatalog {}

impl<T> OrderDatabase for T where T: OrderManagement + AccountManagement + ProductCatalog {}
