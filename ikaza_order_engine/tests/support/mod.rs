#![allow(dead_code)]

use ikaza_common::Money;
use ikaza_order_engine::{
    db_types::{Order, PaymentMethod, Product},
    order_objects::{CartItem, OrderRequest},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{
        CatalogError,
        CheckoutItem,
        GatewayError,
        GatewayPayment,
        GatewayPreference,
        OrderManagement,
        PaymentGateway,
        ProductCatalog,
    },
    SqliteDatabase,
};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_preference(&self, order_id: i64, items: &[CheckoutItem]) -> Result<GatewayPreference, GatewayError>;
        async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
    }
}

mock! {
    pub Catalog {}
    impl ProductCatalog for Catalog {
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
    }
}

/// A fresh, migrated store in the temp directory.
pub async fn new_store() -> SqliteDatabase {
    let url = random_db_path();
    prepare_test_env(&url).await;
    SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database")
}

pub async fn new_user(db: &SqliteDatabase, email: &str) -> i64 {
    db.fetch_or_create_account(email).await.expect("Error creating user").id
}

pub fn cart() -> Vec<CartItem> {
    vec![
        CartItem::new(42, 2, Money::from_cents(1990)).with_name("Zapatilla X").with_color("Azul"),
        CartItem::new(7, 1, Money::from_major_units(35)).with_name("Polo").with_size("M"),
    ]
}

pub async fn place_order(db: &SqliteDatabase, user_id: i64, method: PaymentMethod) -> Order {
    let api = ikaza_order_engine::OrderFlowApi::new(db.clone(), MockGateway::new());
    api.create_order(user_id, OrderRequest::new(method, cart())).await.expect("Error placing order")
}

pub fn payment(id: &str, status: &str, reference: Option<&str>) -> GatewayPayment {
    GatewayPayment {
        id: id.to_string(),
        status: status.to_string(),
        status_detail: None,
        external_reference: reference.map(str::to_string),
    }
}

pub async fn reload(db: &SqliteDatabase, order_id: i64) -> Order {
    db.fetch_order(order_id).await.expect("Error fetching order").expect("Order is missing")
}
