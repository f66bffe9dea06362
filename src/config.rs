//! Environment-driven configuration, loaded once at startup.

use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub stripe_secret_key: String,
    pub stripe_base_url: String,
    pub email_endpoint: Option<String>,
    pub email_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: require("DATABASE_URL")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            jwt_secret: require("JWT_SECRET")?,
            stripe_secret_key: require("STRIPE_SECRET_KEY")?,
            stripe_base_url: env::var("STRIPE_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            email_endpoint: env::var("EMAIL_ENDPOINT").ok(),
            email_from: env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "orders@example.com".to_string()),
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}
