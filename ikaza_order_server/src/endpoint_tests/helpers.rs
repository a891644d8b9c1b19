use actix_web::{
    http::{header::AUTHORIZATION, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, Days, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use log::debug;
use serde_json::Value;

use crate::{
    auth::{JwtClaims, TokenVerifier},
    config::{AuthConfig, ServerOptions},
};

// Signs the tokens used in endpoint tests. DO NOT re-use this secret anywhere.
pub const TEST_SECRET: &str = "d7bb6a0f3c2e4e8aa1b9f4c6e2d05a7e-endpoint-tests";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new(TEST_SECRET)
}

pub fn issue_token(email: &str, expiry: DateTime<Utc>) -> String {
    let claims = JwtClaims { sub: email.to_string(), exp: expiry.timestamp() as usize, iss: None };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).expect("Failed to sign token")
}

pub fn valid_token(email: &str) -> String {
    issue_token(email, Utc::now() + Days::new(1))
}

pub async fn send_request<F>(
    req: TestRequest,
    token: &str,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = req;
    if !token.is_empty() {
        req = req.insert_header((AUTHORIZATION, format!("Bearer {token}")));
    }
    let req = req.to_request();
    let app = App::new()
        .app_data(web::Data::new(TokenVerifier::new(&get_auth_config())))
        .app_data(web::Data::new(ServerOptions::default()))
        .configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?;
    let status = res.status();
    let body = test::read_body(res).await;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}

pub async fn get_request<F>(token: &str, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    send_request(TestRequest::get().uri(path), token, configure).await
}

pub async fn post_request<F>(
    token: &str,
    path: &str,
    body: Value,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    send_request(TestRequest::post().uri(path).set_json(body), token, configure).await
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Response is not JSON ({e}): {body}"))
}
