use thiserror::Error;

/// Failure taxonomy shared by every remote capability.
///
/// `SessionExpired` is only ever constructed after the session store has
/// been forced through `logout()`, so callers can let it propagate without
/// any per-call cleanup.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("session expired or rejected by the server")]
    SessionExpired,

    #[error("{0}")]
    Validation(String),

    #[error("{capability} rejected ({status}): {detail}")]
    Rejected {
        capability: &'static str,
        status: u16,
        detail: String,
    },

    #[error("{capability} failed: no response from server")]
    Transport {
        capability: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// True for failures that should send the user back to the login view.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::SessionExpired)
    }
}
