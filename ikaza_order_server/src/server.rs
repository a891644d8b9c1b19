use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use ikaza_order_engine::{AccountApi, OrderFlowApi, OrderQueryApi, SqliteDatabase};
use log::*;

use crate::{
    auth::TokenVerifier,
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    integrations::mercadopago::MercadoPagoGateway,
    routes::{health, ConfirmPaymentRoute, CreateOrderRoute, MercadopagoCheckoutRoute, MyOrdersRoute, OrderByIdRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.skip_migrations {
        warn!("🗃️ Skipping database migrations. Make sure the schema at {} is up to date.", db.url());
    } else {
        db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    info!("🗃️ Database at {} is ready", db.url());
    let gateway = MercadoPagoGateway::new(config.mercadopago.clone())
        .map_err(|e| ServerError::InitializeError(format!("Could not create the Mercado Pago client. {e}")))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: MercadoPagoGateway,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let auth = config.auth.clone();
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone());
        let query_api = OrderQueryApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let verifier = TokenVerifier::new(&auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ikz::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(query_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(verifier))
            .app_data(web::Data::new(options));
        // `/orders/mine` must be registered before `/orders/{order_id}`
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(ConfirmPaymentRoute::<SqliteDatabase, MercadoPagoGateway>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(MercadopagoCheckoutRoute::<SqliteDatabase, MercadoPagoGateway>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
