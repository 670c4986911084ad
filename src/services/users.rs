//! Username/password account registry.
//!
//! Accounts live in process memory keyed by username. Passwords are stored
//! only as Argon2id PHC strings.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Username already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Public view of an account, returned under the `user` key of `/user/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub firstname: String,
    pub lastname: String,
}

#[derive(Debug, Clone)]
struct UserRecord {
    profile: UserProfile,
    password_hash: String,
}

/// Fields accepted by [`UserStore::register`].
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub firstname: &'a str,
    pub lastname: &'a str,
    pub password: &'a str,
}

pub(crate) fn hash_password(password: &str) -> Result<String, UserError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| UserError::Hash(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| UserError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, UserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserError::MissingField(field));
    }
    Ok(trimmed)
}

/// Hash checked when the username is unknown, so both rejection paths pay
/// for one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password("no-such-account").ok());

#[derive(Default)]
struct Registry {
    by_name: HashMap<String, UserRecord>,
    names_by_id: HashMap<Uuid, String>,
}

#[derive(Clone, Default)]
pub struct UserStore {
    registry: Arc<RwLock<Registry>>,
}

impl UserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account. Usernames are unique and compared after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::MissingField`] for blank fields,
    /// [`UserError::UsernameTaken`] if the username exists, or
    /// [`UserError::Hash`] if the password cannot be hashed.
    pub async fn register(&self, new_user: NewUser<'_>) -> Result<UserProfile, UserError> {
        let username = require(new_user.username, "username")?.to_owned();
        let firstname = require(new_user.firstname, "firstname")?.to_owned();
        let lastname = require(new_user.lastname, "lastname")?.to_owned();
        if new_user.password.is_empty() {
            return Err(UserError::MissingField("password"));
        }

        if self.registry.read().await.by_name.contains_key(&username) {
            return Err(UserError::UsernameTaken);
        }

        let password = new_user.password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| UserError::Hash(e.to_string()))??;

        let mut registry = self.registry.write().await;
        // Re-check under the write lock; another registration may have won.
        if registry.by_name.contains_key(&username) {
            return Err(UserError::UsernameTaken);
        }
        let profile = UserProfile { id: Uuid::new_v4(), username: username.clone(), firstname, lastname };
        registry.names_by_id.insert(profile.id, username.clone());
        registry
            .by_name
            .insert(username, UserRecord { profile: profile.clone(), password_hash });
        tracing::info!(user_id = %profile.id, username = %profile.username, "user registered");
        Ok(profile)
    }

    /// Check a username/password pair.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::InvalidCredentials`] for an unknown username or a
    /// wrong password. Both paths run one Argon2 verification, so neither the
    /// error nor the response time tells them apart.
    pub async fn verify(&self, username: &str, password: &str) -> Result<UserProfile, UserError> {
        let record = self
            .registry
            .read()
            .await
            .by_name
            .get(username.trim())
            .cloned();

        let hash = match &record {
            Some(record) => Some(record.password_hash.clone()),
            None => (*DUMMY_HASH).clone(),
        };
        let password = password.to_owned();
        let ok = tokio::task::spawn_blocking(move || hash.is_some_and(|h| verify_password(&password, &h)))
            .await
            .map_err(|e| UserError::Hash(e.to_string()))?;

        match record {
            Some(record) if ok => Ok(record.profile),
            _ => Err(UserError::InvalidCredentials),
        }
    }

    /// Look up an account by id.
    pub async fn get(&self, id: Uuid) -> Option<UserProfile> {
        let registry = self.registry.read().await;
        let name = registry.names_by_id.get(&id)?;
        registry.by_name.get(name).map(|r| r.profile.clone())
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
