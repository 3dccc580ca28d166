use std::env;
use std::net::SocketAddr;

use crate::error::{AppError, AppResult};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_TOKEN_HOURS: &str = "24";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load settings from the environment (and `.env` when present).
    /// Misconfiguration is reported through the app's own error type so the
    /// caller decides how to fail.
    pub fn load() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let listen_addr = format!("{}:{}", host, port).parse().map_err(|_| {
            AppError::Internal(format!("Invalid listen address {}:{}", host, port))
        })?;

        let jwt_expiration_hours = env::var("JWT_EXPIRATION_HOURS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_HOURS.to_string())
            .parse()
            .map_err(|_| AppError::Internal("JWT_EXPIRATION_HOURS must be a number".to_string()))?;

        Ok(Self {
            database_url: require_var("DATABASE_URL")?,
            jwt_secret: require_var("JWT_SECRET")?,
            jwt_expiration_hours,
            listen_addr,
        })
    }
}

fn require_var(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Internal(format!("{} must be set", name)))
}
