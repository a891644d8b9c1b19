use actix_web::{http::StatusCode, web, web::ServiceConfig};
use ikaza_common::Money;
use ikaza_order_engine::{
    db_types::{PaymentMethod, Product},
    traits::{GatewayError, GatewayPreference},
    AccountApi,
    OrderFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{json, post_request, valid_token},
    mocks::*,
};
use crate::routes::MercadopagoCheckoutRoute;

fn configure(store: MockOrderStore, gateway: MockGateway) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AccountApi::new(accounts())))
            .app_data(web::Data::new(OrderFlowApi::new(store, gateway)))
            .service(MercadopagoCheckoutRoute::<MockOrderStore, MockGateway>::new());
    }
}

/// The storefront sends a blank name for product 42; its name has to come from the catalogue.
fn cart() -> Value {
    json!({
        "cartItems": [
            { "idProducto": 42, "nombreProducto": "", "cantidad": 2, "precioUnitario": 19.90, "color": "Azul" }
        ]
    })
}

fn store_expecting_checkout() -> MockOrderStore {
    let mut store = MockOrderStore::new();
    store.expect_fetch_product().withf(|id| *id == 42).returning(|id| {
        Ok(Some(Product { id, name: "Zapatilla X".into(), sku: None, image_url: None, price: Money::from_cents(1990) }))
    });
    store
        .expect_insert_order()
        .withf(|o| o.payment_method == PaymentMethod::MercadoPago && o.items[0].product_name == "Zapatilla X")
        .times(1)
        .returning(|o| Ok(stored_order(12, &o)));
    store
}

#[actix_web::test]
async fn checkout_redirects_to_mercadopago() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_preference()
        .withf(|order_id, items| {
            *order_id == 12 &&
                items.len() == 1 &&
                items[0].title == "Zapatilla X - Color: Azul" &&
                items[0].quantity == 2 &&
                items[0].unit_price == Money::from_cents(1990)
        })
        .times(1)
        .returning(|_, _| {
            Ok(GatewayPreference {
                id: "pref-12".into(),
                redirect_url: "https://www.mercadopago.com.pe/checkout/v1/redirect?pref_id=pref-12".into(),
            })
        });
    let (status, body) =
        post_request(&valid_token(ANA), "/checkout/mercadopago", cart(), configure(store_expecting_checkout(), gateway))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    let res = json(&body);
    assert_eq!(res["success"], json!(true));
    assert_eq!(res["pedidoId"], json!(12));
    assert_eq!(res["numeroPedido"], json!("PED-20240615-000012"));
    assert_eq!(res["transaccionId"], json!("pref-12"));
    assert_eq!(res["redirectionUrl"], json!("https://www.mercadopago.com.pe/checkout/v1/redirect?pref_id=pref-12"));
    assert_eq!(res["requiresRedirection"], json!(true));
    assert_eq!(res["estado"], json!("PENDIENTE"));
    assert_eq!(res["estadoPago"], json!("PENDIENTE"));
    assert_eq!(res["metodoPago"], json!("MERCADO_PAGO"));
}

#[actix_web::test]
async fn checkout_ignores_the_requested_method() {
    let _ = env_logger::try_init().ok();
    let mut body = cart();
    body["metodoPago"] = json!("EFECTIVO_CONTRAENTREGA");
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_preference()
        .returning(|_, _| Ok(GatewayPreference { id: "pref-12".into(), redirect_url: "https://mp.test".into() }));
    let (status, body) =
        post_request(&valid_token(ANA), "/checkout/mercadopago", body, configure(store_expecting_checkout(), gateway))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["metodoPago"], json!("MERCADO_PAGO"));
}

#[actix_web::test]
async fn gateway_refuses_the_checkout() {
    let _ = env_logger::try_init().ok();
    let mut gateway = MockGateway::new();
    gateway.expect_create_preference().times(1).returning(|_, _| {
        Err(GatewayError::UnexpectedStatus { status: 400, message: "invalid items".into() })
    });
    let (status, body) =
        post_request(&valid_token(ANA), "/checkout/mercadopago", cart(), configure(store_expecting_checkout(), gateway))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("The payment gateway could not complete the request."));
}

#[actix_web::test]
async fn checkout_with_empty_cart() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let mut gateway = MockGateway::new();
    gateway.expect_create_preference().never();
    let (status, body) =
        post_request(&valid_token(ANA), "/checkout/mercadopago", json!({ "cartItems": [] }), configure(store, gateway))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["mensaje"], json!("El carrito está vacío"));
}

#[actix_web::test]
async fn checkout_for_someone_else() {
    let _ = env_logger::try_init().ok();
    let mut store = MockOrderStore::new();
    store.expect_insert_order().never();
    let mut body = cart();
    body["idUsuario"] = json!(ANA_ID);
    let (status, _) =
        post_request(&valid_token(LUIS), "/checkout/mercadopago", body, configure(store, MockGateway::new()))
            .await
            .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
}
