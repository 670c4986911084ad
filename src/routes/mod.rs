//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gateway` is the composition point: it wraps whatever route handlers it is
//! given with request tracing, the foreign-origin guard, and the CORS policy
//! for the configured frontend. `app` mounts the auth routes behind it.

pub mod auth;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Full application router: auth routes + health check behind the gateway.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    let routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/user/me", get(auth::me))
        .route("/healthz", get(healthz))
        .with_state(state);
    gateway(&config, routes)
}

/// Wrap `routes` with the cross-origin policy for `config.allowed_origin`.
///
/// Layer order, outermost first: tracing, origin guard, CORS.
pub fn gateway(config: &ServerConfig, routes: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    routes
        .layer(cors)
        .layer(middleware::from_fn_with_state(config.allowed_origin.clone(), reject_foreign_origin))
        .layer(TraceLayer::new_for_http())
}

/// Refuse cross-origin requests from anywhere but the configured frontend.
///
/// Requests without an `Origin` header are not cross-origin browser calls and
/// pass through.
async fn reject_foreign_origin(State(allowed): State<HeaderValue>, req: Request, next: Next) -> Response {
    match req.headers().get(ORIGIN) {
        Some(origin) if *origin != allowed => {
            tracing::warn!(origin = ?origin, "rejected request from foreign origin");
            ApiError::Forbidden("Origin not allowed".into()).into_response()
        }
        _ => next.run(req).await,
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
