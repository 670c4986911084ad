//! Gateway configuration parsed from environment variables.
//!
//! Read once at startup and shared immutably through [`crate::state::AppState`].

use axum::http::HeaderValue;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("invalid FRONTEND_URL: {0}")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Frontend origin as configured, without a trailing slash.
    pub frontend_url: String,
    /// `frontend_url` pre-parsed for the CORS layer and origin guard.
    pub allowed_origin: HeaderValue,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `FRONTEND_URL`: the only origin allowed to call the API, default
    ///   `http://localhost:5173`
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number or `FRONTEND_URL`
    /// cannot be used as an `Origin` header value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = parse_port(std::env::var("PORT").ok().as_deref())?;
        let frontend_url = std::env::var("FRONTEND_URL").unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_owned());
        Self::new(port, &frontend_url)
    }

    /// Build a config from explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if `frontend_url` is empty or not a valid header value.
    pub fn new(port: u16, frontend_url: &str) -> Result<Self, ConfigError> {
        let frontend_url = frontend_url.trim().trim_end_matches('/').to_owned();
        if frontend_url.is_empty() {
            return Err(ConfigError::InvalidOrigin("empty origin".into()));
        }
        let allowed_origin =
            HeaderValue::from_str(&frontend_url).map_err(|e| ConfigError::InvalidOrigin(e.to_string()))?;
        Ok(Self { port, frontend_url, allowed_origin })
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(v) => v
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(v.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
