//! Caller identity.
//!
//! Access tokens are HS256 JWTs issued by the store's identity service and sent as `Authorization: Bearer <token>`.
//! The token subject is the customer's e-mail address. [`JwtClaims`] is an actix extractor, so a handler that takes a
//! `JwtClaims` argument is only reached with a verified token; anything else is answered with `401`.
use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use ikaza_order_engine::{db_types::UserAccount, traits::AccountManagement, AccountApi};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The customer's e-mail address.
    pub sub: String,
    /// Expiry, in seconds since the Unix epoch.
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Verifies access tokens against the configured secret. One instance is registered as app data per worker.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let key = DecodingKey::from_secret(config.jwt_secret.reveal().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }
        Self { key, validation }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                AuthError::PoorlyFormattedToken(e.to_string())
            },
            _ => AuthError::ValidationError(e.to_string()),
        })?;
        Ok(data.claims)
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| AuthError::PoorlyFormattedToken("Expected a bearer token".to_string()))?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, AuthError> {
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| AuthError::ConfigurationError("No TokenVerifier registered".to_string()))?;
    let token = bearer_token(req)?;
    verifier.verify(token)
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = claims_from_request(req).map_err(|e| {
            debug!("💻️ Rejected request to {}. {e}", req.path());
            ServerError::AuthenticationError(e)
        });
        ready(result)
    }
}

/// Resolves the verified token subject to the account that owns orders. A valid token for an e-mail address that has no
/// account is a `403`.
pub async fn resolve_caller<B: AccountManagement>(
    claims: &JwtClaims,
    accounts: &AccountApi<B>,
) -> Result<UserAccount, ServerError> {
    match accounts.user_for_email(&claims.sub).await? {
        Some(account) => Ok(account),
        None => {
            warn!("💻️ A valid token was presented for {}, but there is no account for it", claims.sub);
            Err(AuthError::AccountNotFound.into())
        },
    }
}
