use chrono::{DateTime, TimeZone, Utc};
use ikaza_common::Money;
use ikaza_order_engine::{
    db_types::{
        NewOrder,
        Order,
        OrderItem,
        OrderStatusType,
        PaymentMethod,
        PaymentStatus,
        Product,
        UserAccount,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        CatalogError,
        CheckoutItem,
        GatewayError,
        GatewayPayment,
        GatewayPreference,
        OrderManagement,
        OrderManagementError,
        OrderWithItemCount,
        PaymentGateway,
        ProductCatalog,
    },
};
use mockall::mock;

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<OrderWithItemCount>, OrderManagementError>;
        async fn approve_payment(&self, order_id: i64, transaction_id: &str, paid_at: DateTime<Utc>) -> Result<Option<Order>, OrderManagementError>;
    }
    impl AccountManagement for OrderStore {
        async fn fetch_user_account_for_email(&self, email: &str) -> Result<Option<UserAccount>, AccountApiError>;
    }
    impl ProductCatalog for OrderStore {
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_preference(&self, order_id: i64, items: &[CheckoutItem]) -> Result<GatewayPreference, GatewayError>;
        async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
    }
}

pub const ANA: &str = "ana@ikaza.pe";
pub const ANA_ID: i64 = 3;
pub const LUIS: &str = "luis@ikaza.pe";
pub const LUIS_ID: i64 = 4;
/// Holds a valid token, but has no account.
pub const GHOST: &str = "ghost@ikaza.pe";

pub fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
}

/// A store that only knows about Ana's and Luis' accounts.
pub fn accounts() -> MockOrderStore {
    let mut store = MockOrderStore::new();
    store.expect_fetch_user_account_for_email().returning(|email| {
        let account = |id| Some(UserAccount { id, email: email.to_string(), created_at: created_at() });
        Ok(match email {
            ANA => account(ANA_ID),
            LUIS => account(LUIS_ID),
            _ => None,
        })
    });
    store
}

pub fn order(id: i64, user_id: i64) -> Order {
    Order {
        id,
        order_number: format!("PED-20240615-{id:06}"),
        user_id,
        subtotal: Money::from_cents(7480),
        shipping_cost: Money::from_major_units(10),
        total: Money::from_cents(8480),
        status: OrderStatusType::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: PaymentMethod::MercadoPago,
        transaction_id: None,
        paid_at: None,
        notes: None,
        created_at: created_at(),
        updated_at: created_at(),
    }
}

pub fn paid_order(id: i64, user_id: i64, transaction_id: &str) -> Order {
    Order {
        payment_status: PaymentStatus::Approved,
        transaction_id: Some(transaction_id.to_string()),
        paid_at: Some(created_at()),
        ..order(id, user_id)
    }
}

pub fn order_item(order_id: i64) -> OrderItem {
    OrderItem {
        id: 1,
        order_id,
        product_id: 42,
        product_name: "Zapatilla X".into(),
        quantity: 2,
        unit_price: Money::from_cents(1990),
        subtotal: Money::from_cents(3980),
        color: Some("Azul".into()),
        size: None,
        sku: Some("ZX-42".into()),
    }
}

/// What a real store would return for `order`, numbered `id`.
pub fn stored_order(id: i64, order: &NewOrder) -> Order {
    Order {
        subtotal: order.subtotal().unwrap(),
        shipping_cost: order.shipping_cost,
        total: order.total().unwrap(),
        payment_method: order.payment_method,
        notes: order.notes.clone(),
        ..self::order(id, order.user_id)
    }
}

pub fn payment(id: &str, status: &str, reference: Option<&str>) -> GatewayPayment {
    GatewayPayment {
        id: id.to_string(),
        status: status.to_string(),
        status_detail: None,
        external_reference: reference.map(String::from),
    }
}
