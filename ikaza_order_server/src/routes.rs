//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database and gateway calls are all async, so keep it that way.
//!
//! Every order route is authenticated. Handlers take a [`JwtClaims`] argument, which only extracts successfully from a
//! request carrying a valid bearer token, and then resolve the token subject to a user account.
use std::str::FromStr;

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use ikaza_order_engine::{
    db_types::PaymentMethod,
    traits::{OrderDatabase, PaymentGateway},
    AccountApi,
    CheckoutError,
    OrderFlowApi,
    OrderFlowError,
    OrderQueryApi,
};
use log::*;

use crate::{
    auth::{resolve_caller, JwtClaims},
    config::ServerOptions,
    data_objects::{ConfirmPaymentRequest, ConfirmPaymentResponse, CreateOrderRequest, OrderResponse},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

pub const MERCADO_PAGO_CHECKOUT_PATH: &str = "/api/checkout/mercadopago";

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderDatabase, PaymentGateway);
/// Places a bank transfer or cash-on-delivery order for the caller.
///
/// Mercado Pago orders are refused here; they must go through the checkout route so that a payment preference exists
/// for them. Validation failures are answered with `success: false` and a message the storefront can display.
pub async fn create_order<B, G>(
    req: HttpRequest,
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    options: web::Data<ServerOptions>,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderDatabase,
    G: PaymentGateway,
{
    let caller = resolve_caller(&claims, accounts.as_ref()).await?;
    let body = body.into_inner();
    info!(
        "💻️ New order from user #{} ({:?}). Method: {:?}. {} items",
        caller.id,
        get_remote_ip(&req, options.as_ref()),
        body.payment_method,
        body.items.len()
    );
    if let Some(response) = reject_foreign_user(&body, caller.id) {
        return Ok(response);
    }
    let method = match body.payment_method.as_deref().map(str::trim) {
        None | Some("") => {
            return Ok(HttpResponse::BadRequest().json(OrderResponse::failure("El método de pago es obligatorio")));
        },
        Some(m) if m == PaymentMethod::MercadoPago.as_str() => {
            return Ok(HttpResponse::BadRequest().json(OrderResponse::failure(format!(
                "MercadoPago debe procesarse desde {MERCADO_PAGO_CHECKOUT_PATH}"
            ))));
        },
        Some(m) => match PaymentMethod::from_str(m) {
            Ok(method) => method,
            Err(e) => {
                debug!("💻️ {e}");
                return Ok(
                    HttpResponse::BadRequest().json(OrderResponse::failure(format!("Método de pago no válido: {m}")))
                );
            },
        },
    };
    if body.items.is_empty() {
        return Ok(HttpResponse::BadRequest().json(OrderResponse::failure("El carrito está vacío")));
    }
    let item_count = body.items.len();
    let order = api.create_order(caller.id, body.into_order_request(method)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_order(&order, item_count, "Pedido creado exitosamente")))
}

route!(my_orders => Get "/orders/mine" impl OrderDatabase);
/// All of the caller's orders, newest first.
pub async fn my_orders<B: OrderDatabase>(
    claims: JwtClaims,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {}", claims.sub);
    let caller = resolve_caller(&claims, accounts.as_ref()).await?;
    let orders = api.orders_for_user(caller.id).await.map_err(|e| {
        debug!("💻️ Could not fetch orders for user #{}. {e}", caller.id);
        ServerError::from(e)
    })?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderDatabase);
/// The full detail of one of the caller's orders. Orders belonging to other customers are reported as not found, the
/// same as orders that do not exist.
pub async fn order_by_id<B: OrderDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order_by_id({order_id})");
    let caller = resolve_caller(&claims, accounts.as_ref()).await?;
    let detail = api.order_detail(order_id, caller.id).await?;
    Ok(HttpResponse::Ok().json(detail))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(confirm_payment => Post "/orders/{order_id}/confirm-payment" impl OrderDatabase, PaymentGateway);
/// Called by the storefront when the buyer returns from Mercado Pago.
///
/// The status in the request body is ignored: Mercado Pago is asked directly what happened to the payment. This route
/// always answers `200` once the caller is authenticated; the outcome is in `success` and `mensaje`.
pub async fn confirm_payment<B, G>(
    req: HttpRequest,
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ConfirmPaymentRequest>,
    options: web::Data<ServerOptions>,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderDatabase,
    G: PaymentGateway,
{
    let order_id = path.into_inner();
    let ConfirmPaymentRequest { payment_id, status } = body.into_inner();
    let payment_id = payment_id.unwrap_or_default();
    info!(
        "💻️ Confirming payment {payment_id} for order #{order_id}. Reported status: {}. Remote: {:?}",
        status.as_deref().unwrap_or("none"),
        get_remote_ip(&req, options.as_ref())
    );
    let result = match resolve_caller(&claims, accounts.as_ref()).await {
        Ok(caller) => match api.confirm_payment(order_id, &payment_id, caller.id).await {
            Ok(confirmation) => ConfirmPaymentResponse::from(confirmation),
            Err(e) => {
                error!("💻️ Could not confirm payment {payment_id} for order #{order_id}. {e}");
                ConfirmPaymentResponse::failure(format!("Error al confirmar el pago: {}", confirmation_error(&e)))
            },
        },
        Err(e) => {
            warn!("💻️ Payment confirmation for order #{order_id} refused. {e}");
            ConfirmPaymentResponse::failure("Error al confirmar el pago: Usuario no encontrado")
        },
    };
    Ok(HttpResponse::Ok().json(result))
}

route!(mercadopago_checkout => Post "/checkout/mercadopago" impl OrderDatabase, PaymentGateway);
/// Places a Mercado Pago order for the caller and returns the checkout URL the buyer must be redirected to.
///
/// If Mercado Pago cannot create the checkout, the order is left pending and a `502` is returned.
pub async fn mercadopago_checkout<B, G>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    accounts: web::Data<AccountApi<B>>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderDatabase,
    G: PaymentGateway,
{
    let caller = resolve_caller(&claims, accounts.as_ref()).await?;
    let body = body.into_inner();
    info!("💻️ Mercado Pago checkout for user #{} with {} items", caller.id, body.items.len());
    if let Some(response) = reject_foreign_user(&body, caller.id) {
        return Ok(response);
    }
    if body.items.is_empty() {
        return Ok(HttpResponse::BadRequest().json(OrderResponse::failure("El carrito está vacío")));
    }
    let item_count = body.items.len();
    let session = api.start_gateway_checkout(caller.id, body.into_order_request(PaymentMethod::MercadoPago)).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::for_checkout(&session, item_count, "Redirigiendo a Mercado Pago")))
}

fn reject_foreign_user(body: &CreateOrderRequest, caller_id: i64) -> Option<HttpResponse> {
    match body.user_id {
        Some(id) if id != caller_id => {
            warn!("💻️ User #{caller_id} tried to place an order on behalf of user #{id}");
            Some(HttpResponse::Forbidden().json(OrderResponse::failure("Usuario no autorizado")))
        },
        _ => None,
    }
}

/// A message for the buyer. Details stay in the logs.
fn confirmation_error(e: &OrderFlowError) -> &'static str {
    match e {
        OrderFlowError::OrderNotFound(_) => "Pedido no encontrado",
        OrderFlowError::TransactionConflict { .. } => "El pedido ya fue pagado con otra transacción",
        OrderFlowError::PaymentOrderMismatch { .. } => "El pago no corresponde a este pedido",
        OrderFlowError::Checkout(CheckoutError::InvalidPaymentId(_)) => "Identificador de pago no válido",
        OrderFlowError::Checkout(_) => "No se pudo consultar el pago en Mercado Pago",
        OrderFlowError::InvalidOrder(_) | OrderFlowError::DatabaseError(_) => "Error interno del servidor",
    }
}
