//! Bearer token issuance and lookup.
//!
//! ARCHITECTURE
//! ============
//! Tokens are opaque random strings mapped to a user id in process memory.
//! Possession of a token is the whole proof of identity; there is no expiry
//! or revocation list.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Live bearer tokens keyed by token string.
///
/// Tokens are never expired or removed: every login adds an entry that lives
/// until the process exits. Expiry and revocation are out of scope, so the
/// map grows with the number of logins.
#[derive(Clone, Default)]
pub struct SessionStore {
    tokens: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token for the given user.
    pub async fn create(&self, user_id: Uuid) -> String {
        let token = generate_token();
        self.tokens.write().await.insert(token.clone(), user_id);
        token
    }

    /// Resolve a token to the user it was issued for.
    pub async fn resolve(&self, token: &str) -> Option<Uuid> {
        self.tokens.read().await.get(token).copied()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
