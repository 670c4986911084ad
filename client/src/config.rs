//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BACKEND_TIMEOUT_SECS: {0} (expected a whole number of seconds above 0)")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Gateway base URL, without a trailing slash.
    pub backend_url: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Build client config from environment variables.
    ///
    /// Optional:
    /// - `BACKEND_URL`: default `http://localhost:3000`
    /// - `BACKEND_TIMEOUT_SECS`: per-request timeout, default 30
    ///
    /// # Errors
    ///
    /// Returns an error if `BACKEND_TIMEOUT_SECS` is set but is not a
    /// positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = std::env::var("BACKEND_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_owned());
        let timeout = parse_timeout(std::env::var("BACKEND_TIMEOUT_SECS").ok().as_deref())?;
        Ok(Self::new(&backend_url).with_timeout(timeout))
    }

    #[must_use]
    pub fn new(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.trim().trim_end_matches('/').to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Absolute URL for an API path such as `/login`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.backend_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }
}

fn parse_timeout(raw: Option<&str>) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_owned())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
