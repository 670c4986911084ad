//! Stub gateway for exercising the client over real HTTP.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::navigate::{Navigator, Route};
use crate::net::api::ApiClient;

/// Canned status and raw body for one endpoint.
#[derive(Clone, Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    pub fn json(status: u16, body: &Value) -> Self {
        Self { status: StatusCode::from_u16(status).unwrap(), body: body.to_string() }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self { status: StatusCode::from_u16(status).unwrap(), body: body.to_owned() }
    }

    fn respond(&self) -> Response {
        (self.status, [(CONTENT_TYPE, "application/json")], self.body.clone()).into_response()
    }
}

#[derive(Clone)]
pub(crate) struct Stub {
    pub login: Reply,
    pub register: Reply,
    pub me: Reply,
    pub me_delay: Duration,
    /// Bearer token that `/user/me` answers with 401 after the given delay,
    /// regardless of `me` and `me_delay`.
    pub stale_token: Option<(&'static str, Duration)>,
    pub login_hits: Arc<AtomicUsize>,
    pub register_hits: Arc<AtomicUsize>,
    pub me_hits: Arc<AtomicUsize>,
    /// `Authorization` header values seen by `/user/me`.
    pub me_auth: Arc<Mutex<Vec<String>>>,
    /// JSON bodies posted to `/login` and `/register`.
    pub posted: Arc<Mutex<Vec<Value>>>,
}

impl Default for Stub {
    fn default() -> Self {
        Self {
            login: Reply::json(200, &json!({ "token": "T" })),
            register: Reply::json(201, &json!({ "message": "User registered" })),
            me: Reply::json(200, &json!({ "user": profile_json() })),
            me_delay: Duration::ZERO,
            stale_token: None,
            login_hits: Arc::default(),
            register_hits: Arc::default(),
            me_hits: Arc::default(),
            me_auth: Arc::default(),
            posted: Arc::default(),
        }
    }
}

impl Stub {
    pub fn me_hits(&self) -> usize {
        self.me_hits.load(Ordering::SeqCst)
    }

    pub fn login_hits(&self) -> usize {
        self.login_hits.load(Ordering::SeqCst)
    }

    pub fn register_hits(&self) -> usize {
        self.register_hits.load(Ordering::SeqCst)
    }

    pub fn me_auth(&self) -> Vec<String> {
        self.me_auth.lock().unwrap().clone()
    }

    pub fn posted(&self) -> Vec<Value> {
        self.posted.lock().unwrap().clone()
    }

    /// Serve this stub on an ephemeral port and return a client for it.
    pub async fn spawn(&self) -> ApiClient {
        let router = Router::new()
            .route("/login", post(stub_login))
            .route("/register", post(stub_register))
            .route("/user/me", get(stub_me))
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        ApiClient::new(ClientConfig::new(&format!("http://{addr}"))).unwrap()
    }
}

pub(crate) fn profile_json() -> Value {
    json!({ "id": "00000000-0000-0000-0000-000000000001", "username": "alice", "firstname": "Alice", "lastname": "Liddell" })
}

/// Client pointed at a port with no listener.
pub(crate) async fn unreachable_client() -> ApiClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    ApiClient::new(ClientConfig::new(&format!("http://{addr}")).with_timeout(Duration::from_secs(2))).unwrap()
}

async fn stub_login(State(stub): State<Stub>, body: String) -> Response {
    stub.login_hits.fetch_add(1, Ordering::SeqCst);
    if let Ok(value) = serde_json::from_str(&body) {
        stub.posted.lock().unwrap().push(value);
    }
    stub.login.respond()
}

async fn stub_register(State(stub): State<Stub>, body: String) -> Response {
    stub.register_hits.fetch_add(1, Ordering::SeqCst);
    if let Ok(value) = serde_json::from_str(&body) {
        stub.posted.lock().unwrap().push(value);
    }
    stub.register.respond()
}

async fn stub_me(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    stub.me_hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    if let Some(auth) = &auth {
        stub.me_auth.lock().unwrap().push(auth.clone());
    }
    if let Some((token, delay)) = stub.stale_token {
        if auth.as_deref() == Some(format!("Bearer {token}").as_str()) {
            tokio::time::sleep(delay).await;
            return Reply::json(401, &json!({ "message": "expired" })).respond();
        }
    }
    if !stub.me_delay.is_zero() {
        tokio::time::sleep(stub.me_delay).await;
    }
    stub.me.respond()
}

/// Navigator that records every route it is asked for.
#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}
