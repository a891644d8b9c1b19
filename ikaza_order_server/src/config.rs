use std::env;

use ikaza_common::{helpers::parse_boolean_flag, Secret};
use log::*;
use mercadopago_tools::MercadoPagoConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_IKZ_HOST: &str = "127.0.0.1";
const DEFAULT_IKZ_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ikaza_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Mercado Pago credentials and redirect URLs. Handed to the gateway client at start-up.
    pub mercadopago: MercadoPagoConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the `Forwarded` header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// If true, the bundled schema migrations are not applied at start-up.
    pub skip_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_IKZ_HOST.to_string(),
            port: DEFAULT_IKZ_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            mercadopago: MercadoPagoConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            skip_migrations: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("IKZ_HOST").ok().unwrap_or_else(|| DEFAULT_IKZ_HOST.into());
        let port = env::var("IKZ_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for IKZ_PORT. {e} Using the default, {DEFAULT_IKZ_PORT}, instead."
                    );
                    DEFAULT_IKZ_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_IKZ_PORT);
        let database_url = env::var("IKZ_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ IKZ_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let mercadopago = MercadoPagoConfig::new_from_env_or_default();
        if mercadopago.access_token.reveal().is_empty() {
            warn!("🪛️ No Mercado Pago access token is configured. Checkouts and payment confirmations will fail.");
        }
        let use_x_forwarded_for = parse_boolean_flag(env::var("IKZ_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("IKZ_USE_FORWARDED").ok(), false);
        let skip_migrations = parse_boolean_flag(env::var("IKZ_SKIP_MIGRATIONS").ok(), false);
        Self { host, port, database_url, auth, mercadopago, use_x_forwarded_for, use_forwarded, skip_migrations }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the configuration that handlers need. It holds no secrets, so it can be passed around freely.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
/// Access tokens are issued by the store's identity service. This server only verifies them.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared HS256 secret used to verify access tokens.
    pub jwt_secret: Secret<String>,
    /// When set, tokens must carry this `iss` claim.
    pub issuer: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No token issued by \
             the identity service will be accepted. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), issuer: None }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(jwt_secret: S) -> Self {
        Self { jwt_secret: Secret::new(jwt_secret.into()), issuer: None }
    }

    pub fn with_issuer<S: Into<String>>(mut self, issuer: S) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("IKZ_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [IKZ_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("IKZ_JWT_SECRET is empty".to_string()));
        }
        let issuer = env::var("IKZ_JWT_ISSUER").ok().filter(|s| !s.trim().is_empty());
        match &issuer {
            Some(iss) => info!("🪛️ Access tokens must be issued by {iss}"),
            None => debug!("🪛️ IKZ_JWT_ISSUER is not set. The token issuer will not be checked."),
        }
        Ok(Self { jwt_secret: Secret::new(secret), issuer })
    }
}
