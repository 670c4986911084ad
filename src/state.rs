//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the immutable startup configuration plus the account and token
//! stores. Clone is required by Axum; all inner fields are Arc-wrapped.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::session::SessionStore;
use crate::services::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub users: UserStore,
    pub sessions: SessionStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config, users: UserStore::new(), sessions: SessionStore::new() }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
