use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::env;

/// Application configuration, loaded once at startup from environment
/// variables (a `.env` file is honored via `dotenv` in `main`).
///
/// `DATABASE_URL` and `JWT_SECRET` are required; everything else has a
/// default. The loaded value is shared through `web::Data<Config>` so no
/// component reads the environment after startup.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,

    /// Server-wide secret used to sign and verify tokens.
    pub jwt_secret: String,
    /// Named signing algorithm, e.g. "HS256". Fixed by configuration,
    /// never negotiated per request.
    pub jwt_algorithm: Algorithm,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,

    /// bcrypt cost factor. Security/performance trade-off knob.
    pub bcrypt_cost: u32,

    /// Request header carrying the credential on protected endpoints.
    pub auth_header: String,
    /// When true the header value must use the standard `Bearer <token>`
    /// scheme; when false the header carries the raw token string. Per
    /// deployment, never mixed.
    pub auth_bearer_scheme: bool,
    /// When false, tokens stamped as refresh tokens are rejected at
    /// protected endpoints. Defaults to true, which matches the historical
    /// behavior of accepting any valid token regardless of how it was issued.
    pub refresh_tokens_authenticate: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_algorithm: env::var("JWT_ALGORITHM")
                .unwrap_or_else(|_| "HS256".to_string())
                .parse()
                .expect("JWT_ALGORITHM must be a valid algorithm name"),
            access_token_ttl: Duration::minutes(
                env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("ACCESS_TOKEN_EXPIRE_MINUTES must be a number"),
            ),
            refresh_token_ttl: Duration::hours(
                env::var("REFRESH_TOKEN_EXPIRE_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .expect("REFRESH_TOKEN_EXPIRE_HOURS must be a number"),
            ),
            bcrypt_cost: env::var("BCRYPT_COST")
                .unwrap_or_else(|_| "12".to_string())
                .parse()
                .expect("BCRYPT_COST must be a number"),
            auth_header: env::var("AUTH_HEADER").unwrap_or_else(|_| "Authorization".to_string()),
            auth_bearer_scheme: env::var("AUTH_BEARER_SCHEME")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true),
            refresh_tokens_authenticate: env::var("REFRESH_TOKENS_AUTHENTICATE")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
