use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Duration, Utc};
use ikaza_common::Money;
use ikaza_order_engine::{
    db_types::PaymentMethod,
    traits::{OrderManagementError, OrderWithItemCount},
    AccountApi,
    OrderFlowApi,
    OrderQueryApi,
};
use serde_json::json;

use super::{
    helpers::{get_request, issue_token, json, post_request, valid_token},
    mocks::*,
};
use crate::routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute};

fn configure_queries(store: MockOrderStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(accounts())))
            .app_data(web::Data::new(OrderQueryApi::new(store)))
            .service(MyOrdersRoute::<MockOrderStore>::new())
            .service(OrderByIdRoute::<MockOrderStore>::new());
    }
}

fn configure_create(store: MockOrderStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(accounts())))
            .app_data(web::Data::new(OrderFlowApi::new(store, MockGateway::new())))
            .service(CreateOrderRoute::<MockOrderStore, MockGateway>::new());
    }
}

fn two_orders() -> MockOrderStore {
    let mut store = MockOrderStore::new();
    store.expect_fetch_orders_for_user().withf(|id| *id == ANA_ID).returning(|_| {
        Ok(vec![
            OrderWithItemCount { order: paid_order(8, ANA_ID, "1319271112"), item_count: 2 },
            OrderWithItemCount { order: order(7, ANA_ID), item_count: 1 },
        ])
    });
    store
}

//----------------------------------------------   Authentication  ----------------------------------------------------

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/orders/mine", configure_queries(MockOrderStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json(&body)["error"].as_str().unwrap().contains("No access token was provided"));
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = valid_token(ANA);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let (status, body) = get_request(&token, "/orders/mine", configure_queries(MockOrderStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Authentication Error. Access token is invalid."));
}

#[actix_web::test]
async fn fetch_my_orders_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(ANA, Utc::now() - Duration::hours(2));
    let (status, _) = get_request(&token, "/orders/mine", configure_queries(MockOrderStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_my_orders_without_account() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(GHOST);
    let (status, body) = get_request(&token, "/orders/mine", configure_queries(MockOrderStore::new())).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body), json!({ "error": "Authentication Error. User account not found." }));
}

//----------------------------------------------   Queries  ----------------------------------------------------

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = valid_token(ANA);
    let (status, body) = get_request(&token, "/orders/mine", configure_queries(two_orders())).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let orders = json(&body);
    let orders = orders.as_array().expect("Expected a list of orders");
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["pedidoId"], json!(8));
    assert_eq!(orders[0]["estadoPago"], json!("APROBADO"));
    assert_eq!(orders[0]["transaccionId"], json!("1319271112"));
    assert_eq!(orders[0]["cantidadProductos"], json!(2));
    assert_eq!(orders[1]["numeroPedido"], json!("PED-20240615-000007"));
    assert_eq!(orders[1]["estado"], json!("PENDIENTE"));
    assert_eq!(orders[1]["total"], json!(84.8));
    assert_eq!(orders[1]["transaccionId"], json!(null));
}

#[actix_web::test]
async fn fetch_my_orders_when_there_are_none() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_orders_for_user().returning(|_| Ok(vec![]));
    let (status, body) = get_request(&valid_token(LUIS), "/orders/mine", configure_queries(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!([]));
}

#[actix_web::test]
async fn fetch_my_orders_database_failure() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store
        .expect_fetch_orders_for_user()
        .returning(|_| Err(OrderManagementError::DatabaseError("database is locked".into())));
    let (status, body) = get_request(&valid_token(ANA), "/orders/mine", configure_queries(store)).await.unwrap();
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json(&body);
    assert!(body.is_object(), "Errors are a single object, not a list");
    assert!(!body["error"].as_str().unwrap().contains("locked"));
}

#[actix_web::test]
async fn fetch_own_order_by_id() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().withf(|id| *id == 7).returning(|_| Ok(Some(order(7, ANA_ID))));
    store.expect_fetch_order_items().withf(|id| *id == 7).returning(|id| Ok(vec![order_item(id)]));
    let (status, body) = get_request(&valid_token(ANA), "/orders/7", configure_queries(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let detail = json(&body);
    assert_eq!(detail["pedidoId"], json!(7));
    assert_eq!(detail["costoEnvio"], json!(10.0));
    assert_eq!(detail["cantidadProductos"], json!(1));
    assert_eq!(detail["items"][0]["nombreProducto"], json!("Zapatilla X"));
    assert_eq!(detail["items"][0]["subtotal"], json!(39.8));
}

#[actix_web::test]
async fn someone_elses_order_looks_like_a_missing_one() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_order().withf(|id| *id == 7).returning(|_| Ok(Some(order(7, ANA_ID))));
    store.expect_fetch_order().withf(|id| *id == 70).returning(|_| Ok(None));
    store.expect_fetch_order_items().never();
    let (status, foreign) = get_request(&valid_token(LUIS), "/orders/7", configure_queries(store)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut store = MockOrderStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let (status, missing) = get_request(&valid_token(LUIS), "/orders/7", configure_queries(store)).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(foreign, missing);
}

//----------------------------------------------   Create  ----------------------------------------------------

fn order_body(method: &str) -> serde_json::Value {
    json!({
        "idUsuario": ANA_ID,
        "metodoPago": method,
        "cartItems": [
            { "idProducto": 42, "nombreProducto": "Zapatilla X", "cantidad": 2, "precioUnitario": 19.90, "color": "Azul" },
            { "idProducto": 7, "nombreProducto": "Polo", "cantidad": 1, "precioUnitario": "35.00", "talla": "M" }
        ],
        "costoEnvio": 10,
        "direccionEnvio": "Av. Arequipa 123, Lima"
    })
}

#[actix_web::test]
async fn create_bank_transfer_order() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_fetch_product().never();
    store
        .expect_insert_order()
        .withf(|o| {
            o.user_id == ANA_ID &&
                o.payment_method == PaymentMethod::BankTransfer &&
                o.items.len() == 2 &&
                o.subtotal().ok() == Some(Money::from_cents(7480)) &&
                o.total().ok() == Some(Money::from_cents(8480)) &&
                o.notes.as_deref() == Some("Av. Arequipa 123, Lima")
        })
        .times(1)
        .returning(|o| Ok(stored_order(11, &o)));
    let token = valid_token(ANA);
    let (status, body) =
        post_request(&token, "/orders", order_body("TRANSFERENCIA_BANCARIA"), configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let res = json(&body);
    assert_eq!(res["success"], json!(true));
    assert_eq!(res["pedidoId"], json!(11));
    assert_eq!(res["numeroPedido"], json!("PED-20240615-000011"));
    assert_eq!(res["subtotal"], json!(74.8));
    assert_eq!(res["total"], json!(84.8));
    assert_eq!(res["metodoPago"], json!("TRANSFERENCIA_BANCARIA"));
    assert_eq!(res["estadoPago"], json!("PENDIENTE"));
    assert_eq!(res["requiresRedirection"], json!(false));
    assert_eq!(res["cantidadProductos"], json!(2));
}

#[actix_web::test]
async fn create_order_for_someone_else() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let token = valid_token(LUIS);
    let (status, body) =
        post_request(&token, "/orders", order_body("TRANSFERENCIA_BANCARIA"), configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json(&body)["mensaje"], json!("Usuario no autorizado"));
    assert_eq!(json(&body)["success"], json!(false));
}

#[actix_web::test]
async fn create_mercadopago_order_is_refused() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let (status, body) =
        post_request(&valid_token(ANA), "/orders", order_body("MERCADO_PAGO"), configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["mensaje"], json!("MercadoPago debe procesarse desde /api/checkout/mercadopago"));
}

#[actix_web::test]
async fn create_order_with_empty_cart() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let body = json!({ "metodoPago": "EFECTIVO_CONTRAENTREGA", "cartItems": [] });
    let (status, body) = post_request(&valid_token(ANA), "/orders", body, configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["mensaje"], json!("El carrito está vacío"));
}

#[actix_web::test]
async fn create_order_with_unknown_method() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let (status, body) =
        post_request(&valid_token(ANA), "/orders", order_body("BITCOIN"), configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["mensaje"], json!("Método de pago no válido: BITCOIN"));
}

#[actix_web::test]
async fn create_order_with_zero_quantity() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let body = json!({
        "metodoPago": "EFECTIVO_CONTRAENTREGA",
        "cartItems": [{ "idProducto": 42, "nombreProducto": "Zapatilla X", "cantidad": 0, "precioUnitario": 19.90 }]
    });
    let (status, body) = post_request(&valid_token(ANA), "/orders", body, configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("invalid quantity"));
}

#[actix_web::test]
async fn create_order_with_oversized_amounts() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let body = json!({
        "metodoPago": "TRANSFERENCIA_BANCARIA",
        "cartItems": [{ "idProducto": 42, "nombreProducto": "Zapatilla X", "cantidad": 2, "precioUnitario": "90000000000000000.00" }]
    });
    let (status, body) = post_request(&valid_token(ANA), "/orders", body, configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("too large"));
}

#[actix_web::test]
async fn create_order_with_too_many_units() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let body = json!({
        "metodoPago": "TRANSFERENCIA_BANCARIA",
        "cartItems": [{ "idProducto": 42, "nombreProducto": "Zapatilla X", "cantidad": 922337203685477580_i64, "precioUnitario": 19.90 }]
    });
    let (status, body) = post_request(&valid_token(ANA), "/orders", body, configure_create(store)).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json(&body)["error"].as_str().unwrap().contains("invalid quantity"));
}
