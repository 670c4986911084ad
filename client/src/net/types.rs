//! Wire types shared with the gateway's auth routes.

use serde::{Deserialize, Serialize};

/// Login payload for `POST /login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

/// Registration payload for `POST /register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

/// Profile returned under the `user` key of `GET /user/me`.
///
/// Opaque to the client: fields are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(pub serde_json::Value);

impl UserProfile {
    /// Read a top-level string field, e.g. `"username"`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}
