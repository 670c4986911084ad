//! Session state: who is logged in, and whether we have checked yet.
//!
//! DESIGN
//! ======
//! One [`Session`] is built at application start and passed by reference to
//! the UI. The load-time check is single-shot: `Unchecked -> Checking ->
//! Checked`, and a second `verify_auth` while `Checking` waits on the first
//! rather than issuing its own request.
//!
//! Login commits nothing until both the credential exchange and the profile
//! fetch succeed, so a stored token always has a matching `user`. A check
//! still in flight when a login or logout lands leaves the newer state alone.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use tokio::sync::OnceCell;

use crate::navigate::{Navigator, Route};
use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{Credentials, RegistrationRequest, UserProfile};
use crate::storage::{StorageError, TokenStore};

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Failure surfaced to the UI. `Display` is the text to show.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server refused the request; carries its message or a fallback.
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to fetch user data after login")]
    ProfileUnavailable,
    #[error("Failed to save session")]
    Storage(#[source] StorageError),
    #[error("Network error occurred")]
    Network(#[source] ApiError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthCheck {
    #[default]
    Unchecked,
    Checking,
    Checked,
}

/// Snapshot of the in-memory session fields.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub check: AuthCheck,
}

#[derive(Debug, Default)]
struct Inner {
    auth: AuthState,
    /// Bumped by every login and logout. A load-time check that finishes
    /// under a different epoch must not touch the token or `user`.
    epoch: u64,
}

pub struct Session<S, N> {
    api: ApiClient,
    store: S,
    navigator: N,
    state: RwLock<Inner>,
    verified: OnceCell<()>,
}

impl<S: TokenStore, N: Navigator> Session<S, N> {
    #[must_use]
    pub fn new(api: ApiClient, store: S, navigator: N) -> Self {
        Self { api, store, navigator, state: RwLock::new(Inner::default()), verified: OnceCell::new() }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .auth
            .clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.snapshot().user
    }

    #[must_use]
    pub fn auth_check(&self) -> AuthCheck {
        self.snapshot().check
    }

    /// True once the load-time check has finished, whatever its outcome.
    #[must_use]
    pub fn auth_checked(&self) -> bool {
        self.auth_check() == AuthCheck::Checked
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Inner> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn stored_token(&self) -> Option<String> {
        self.store.load().unwrap_or_else(|e| {
            tracing::error!(error = %e, "token storage unreadable; treating as logged out");
            None
        })
    }

    fn discard_token(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "failed to clear stored token");
        }
    }

    /// Rehydrate `user` from the stored token. Runs at most once per session;
    /// concurrent callers await the same check.
    pub async fn verify_auth(&self) {
        self.verified.get_or_init(|| self.check_stored_token()).await;
    }

    async fn check_stored_token(&self) {
        let started = {
            let mut state = self.write_state();
            state.auth.check = AuthCheck::Checking;
            state.epoch
        };

        let Some(token) = self.stored_token() else {
            self.write_state().auth.check = AuthCheck::Checked;
            return;
        };

        let outcome = self.api.fetch_current_user(&token).await;

        let mut state = self.write_state();
        state.auth.check = AuthCheck::Checked;
        if state.epoch != started {
            tracing::debug!("login or logout during auth check; discarding its result");
            return;
        }
        match outcome {
            Ok(user) => state.auth.user = Some(user),
            Err(e) => {
                match &e {
                    ApiError::Rejected { status, .. } => {
                        tracing::warn!(%status, "stored token rejected");
                    }
                    _ => tracing::error!(error = %e, "auth verification failed"),
                }
                self.discard_token();
                state.auth.user = None;
            }
        }
    }

    /// Exchange credentials for a token, fetch the profile, and only then
    /// persist the token, set `user`, and navigate to the profile view.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] whose `Display` is the message for the UI.
    /// On error nothing is persisted and `user` is unchanged.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SessionError> {
        let credentials = Credentials::new(username, password);
        let token = self
            .api
            .login(&credentials)
            .await
            .map_err(|e| rejection_or_network(e, LOGIN_FAILED, "login failed"))?;

        let user = self
            .api
            .fetch_current_user(&token)
            .await
            .map_err(|e| match e {
                ApiError::Rejected { status, .. } => {
                    tracing::warn!(%status, "profile fetch after login rejected");
                    SessionError::ProfileUnavailable
                }
                other => {
                    tracing::error!(error = %other, "profile fetch after login failed");
                    SessionError::Network(other)
                }
            })?;

        {
            // Token, user, and epoch change together so an in-flight auth
            // check sees either none or all of them.
            let mut state = self.write_state();
            self.store.save(&token).map_err(|e| {
                tracing::error!(error = %e, "failed to persist token");
                SessionError::Storage(e)
            })?;
            state.auth.user = Some(user);
            state.epoch += 1;
        }
        self.navigator.navigate(Route::Profile);
        Ok(())
    }

    /// Create an account and navigate to the success view. Does not log in.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] whose `Display` is the message for the UI.
    pub async fn register(&self, request: &RegistrationRequest) -> Result<(), SessionError> {
        self.api
            .register(request)
            .await
            .map_err(|e| rejection_or_network(e, REGISTRATION_FAILED, "registration failed"))?;
        self.navigator.navigate(Route::RegisterSuccess);
        Ok(())
    }

    /// Forget the token and user, then navigate to the root view.
    pub fn logout(&self) {
        {
            let mut state = self.write_state();
            self.discard_token();
            state.auth.user = None;
            state.epoch += 1;
        }
        self.navigator.navigate(Route::Root);
    }
}

fn rejection_or_network(err: ApiError, fallback: &str, context: &'static str) -> SessionError {
    match err {
        ApiError::Rejected { message, .. } => SessionError::Rejected(message.unwrap_or_else(|| fallback.to_owned())),
        other => {
            tracing::error!(error = %other, "{context}");
            SessionError::Network(other)
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
