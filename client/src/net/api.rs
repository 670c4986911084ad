//! REST helpers for communicating with the gateway.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError::Rejected`] carrying the server's
//! `message` when the body has one. Transport failures and undecodable
//! success bodies are kept distinct so the session layer can pick its
//! user-facing text.

use reqwest::StatusCode;

use super::types::{Credentials, ErrorBody, LoginResponse, MeResponse, RegistrationRequest, UserProfile};
use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request rejected with status {status}")]
    Rejected { status: StatusCode, message: Option<String> },
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("response decode failed: {0}")]
    Decode(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Server-provided message for a rejected request, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Thin HTTP wrapper around the gateway's `/login`, `/register`, and
/// `/user/me` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// `POST /login`, returning the issued bearer token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] on a non-2xx status, [`ApiError::Transport`] if
    /// the request never completes, [`ApiError::Decode`] if the success body
    /// lacks a token.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(self.config.endpoint("/login"))
            .json(credentials)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let body: LoginResponse = decode_success(resp).await?;
        Ok(body.token)
    }

    /// `POST /register`. The success body is ignored.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] on a non-2xx status, [`ApiError::Transport`] if
    /// the request never completes.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.config.endpoint("/register"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        ensure_success(resp).await.map(drop)
    }

    /// `GET /user/me` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Rejected`] if the token is refused, [`ApiError::Transport`]
    /// if the request never completes, [`ApiError::Decode`] if the body has
    /// no `user`.
    pub async fn fetch_current_user(&self, token: &str) -> Result<UserProfile, ApiError> {
        let resp = self
            .http
            .get(self.config.endpoint("/user/me"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let body: MeResponse = decode_success(resp).await?;
        Ok(body.user)
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    // A missing or non-JSON error body is not itself an error.
    let body = resp.bytes().await.unwrap_or_default();
    let message = parse_error_message(&body);
    Err(ApiError::Rejected { status, message })
}

async fn decode_success<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    let resp = ensure_success(resp).await?;
    let bytes = resp.bytes().await.map_err(ApiError::Transport)?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

pub(crate) fn parse_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
