//! Auth routes: credential login, registration, and current-user lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::users::{NewUser, UserError, UserProfile};
use crate::state::AppState;

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

pub(crate) fn user_error_to_api(err: UserError) -> ApiError {
    match err {
        UserError::MissingField(_) => ApiError::BadRequest(err.to_string()),
        UserError::UsernameTaken => ApiError::Conflict(err.to_string()),
        UserError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
        UserError::Hash(_) => ApiError::Internal(err.to_string()),
    }
}

/// Unwrap a JSON body, turning axum's plain-text rejection into `{message}`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub(crate) fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user resolved from the bearer token.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: UserProfile,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized("Missing or invalid token".into());
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(unauthorized)?;

        let app_state = AppState::from_ref(state);
        let user_id = app_state
            .sessions
            .resolve(token)
            .await
            .ok_or_else(unauthorized)?;
        let user = app_state
            .users
            .get(user_id)
            .await
            .ok_or_else(unauthorized)?;

        Ok(Self { user })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /login` — exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let req = json_body(payload)?;
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Username and password are required".into()));
    }

    let user = state
        .users
        .verify(&req.username, &req.password)
        .await
        .map_err(|e| {
            tracing::info!(username = %req.username.trim(), "login rejected");
            user_error_to_api(e)
        })?;

    let token = state.sessions.create(user.id).await;
    tracing::info!(user_id = %user.id, "login succeeded");
    Ok(Json(LoginResponse { token }))
}

/// `POST /register` — create an account. Does not log the user in.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let req = json_body(payload)?;
    state
        .users
        .register(NewUser {
            username: &req.username,
            firstname: &req.firstname,
            lastname: &req.lastname,
            password: &req.password,
        })
        .await
        .map_err(user_error_to_api)?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "message": "User registered" }))))
}

/// `GET /user/me` — return the user owning the bearer token.
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user: auth.user })
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
