use std::sync::Arc;

use loginkit::config::ServerConfig;
use loginkit::{routes, state};

#[tokio::main]
async fn main() {
    // A missing .env file is normal outside local development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(frontend_url = %config.frontend_url, "cross-origin policy configured");

    let state = state::AppState::new(Arc::new(config));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "loginkit listening");
    axum::serve(listener, app).await.expect("server failed");
}
