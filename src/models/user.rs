use serde::{Deserialize, Serialize};

/// Profile attributes of the signed-in user.
///
/// Every field is an optional string; the service fills in what it knows.
/// Updates are all-or-nothing: the full identity is submitted and the local
/// copy is only replaced by the server's confirmed version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}

impl Identity {
    /// Best available handle for display: username, then email.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("anonymous")
    }
}

/// Body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    pub password: String,
}

/// Body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login: the bearer credential plus the profile when the
/// service includes one.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<Identity>,
}

/// Body for `POST /auth/change-password`.
#[derive(Debug, Serialize)]
pub struct PasswordChange<'a> {
    pub old: &'a str,
    pub new: &'a str,
}

/// Profile updates come back wrapped: `{"user": {...}}`.
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: Identity,
}

/// Bare confirmation body: `{"message": "..."}`.
#[derive(Debug, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}
