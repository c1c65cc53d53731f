//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub gateway_url: String,
    pub gateway_api_key: String,
    pub model: String,
    /// Origin allowed to make credentialed calls to the row-store routes.
    pub client_origin: String,
    pub max_body_bytes: usize,
    pub session_ttl_days: i64,
    /// Marks the session cookie `Secure`. Only disable for plain-http development.
    pub secure_cookies: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = required_var("DATABASE_URL")?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Upstream Gateway Settings ---
        let gateway_url =
            std::env::var("AI_GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string());
        let gateway_api_key = required_var("AI_GATEWAY_API_KEY")?;
        let model = std::env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        // --- Load HTTP Settings ---
        let client_origin = std::env::var("CLIENT_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());
        let max_body_bytes = parse_var("MAX_BODY_BYTES", "10485760")?;
        let session_ttl_days = parse_var("SESSION_TTL_DAYS", "30")?;
        let secure_cookies = parse_var("SECURE_COOKIES", "true")?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            gateway_url,
            gateway_api_key,
            model,
            client_origin,
            max_body_bytes,
            session_ttl_days,
            secure_cookies,
        })
    }
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_uses_default_and_reports_bad_values() {
        let port: u16 = parse_var("RYTU_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);

        let err = parse_var::<u16>("RYTU_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "RYTU_TEST_UNSET_PORT"));
    }

    #[test]
    fn missing_required_var_is_named() {
        let err = required_var("RYTU_TEST_DEFINITELY_MISSING").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing the environment variable RYTU_TEST_DEFINITELY_MISSING"
        );
    }
}
