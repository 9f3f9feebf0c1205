//! Profile editor — draft state for identity and password changes.
//!
//! Two independent edit modes, each with its own draft and submit/cancel
//! pair; both may be active at once. Nothing commits locally until the
//! server has accepted the change, and a failed submit keeps the mode
//! active with the draft intact so the user can correct and retry.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::models::Identity;
use crate::session::SessionStore;

/// Old/new password pair awaiting submission.
#[derive(Debug, Clone, Default)]
pub struct PasswordDraft {
    pub old: String,
    pub new: String,
}

#[derive(Default)]
struct EditorState {
    identity_draft: Option<Identity>,
    password_draft: Option<PasswordDraft>,
    notice: Option<String>,
}

pub struct ProfileEditor {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    state: Mutex<EditorState>,
}

impl ProfileEditor {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            state: Mutex::new(EditorState::default()),
        }
    }

    /// Last user-visible confirmation or error message.
    pub fn notice(&self) -> Option<String> {
        self.lock().notice.clone()
    }

    // ── Identity edit mode ────────────────────────────────────

    pub fn is_editing(&self) -> bool {
        self.lock().identity_draft.is_some()
    }

    /// Enter edit mode with a draft seeded from the current identity.
    pub fn begin_edit(&self) -> Identity {
        let draft = self.session.identity();
        self.lock().identity_draft = Some(draft.clone());
        draft
    }

    /// Replace the pending draft. Enters edit mode if not already active.
    pub fn set_draft(&self, draft: Identity) {
        self.lock().identity_draft = Some(draft);
    }

    pub fn draft(&self) -> Option<Identity> {
        self.lock().identity_draft.clone()
    }

    /// Leave edit mode, discarding the draft.
    pub fn cancel_edit(&self) {
        self.lock().identity_draft = None;
    }

    /// Submit the full draft (not a diff). On success the session store
    /// adopts the identity the server confirmed and edit mode ends; on
    /// failure the mode stays active with the draft preserved.
    pub async fn save_profile(&self) -> Result<Identity, ApiError> {
        let Some(draft) = self.draft() else {
            return Err(ApiError::Validation("no profile edit in progress".into()));
        };

        match self.api.update_profile(&draft).await {
            Ok(confirmed) => {
                if let Err(e) = self.session.update_identity(confirmed.clone()) {
                    warn!(error = %e, "profile saved but session persistence failed");
                }
                let mut state = self.lock();
                state.identity_draft = None;
                state.notice = Some("Profile updated successfully!".into());
                info!("profile updated");
                Ok(confirmed)
            }
            Err(e) => {
                if !matches!(e, ApiError::SessionExpired) {
                    self.lock().notice = Some(format!("Failed to update profile: {e}"));
                }
                Err(e)
            }
        }
    }

    // ── Password change mode ──────────────────────────────────

    pub fn is_changing_password(&self) -> bool {
        self.lock().password_draft.is_some()
    }

    pub fn begin_password_change(&self) {
        self.lock().password_draft = Some(PasswordDraft::default());
    }

    pub fn set_password_draft(&self, old: impl Into<String>, new: impl Into<String>) {
        self.lock().password_draft = Some(PasswordDraft {
            old: old.into(),
            new: new.into(),
        });
    }

    pub fn cancel_password_change(&self) {
        self.lock().password_draft = None;
    }

    /// Submit the password pair. The draft is cleared and the mode exited
    /// only after the server accepts the change.
    pub async fn change_password(&self) -> Result<(), ApiError> {
        let Some(draft) = self.lock().password_draft.clone() else {
            return Err(ApiError::Validation(
                "no password change in progress".into(),
            ));
        };

        match self.api.change_password(&draft.old, &draft.new).await {
            Ok(()) => {
                let mut state = self.lock();
                state.password_draft = None;
                state.notice = Some("Password changed successfully!".into());
                info!("password changed");
                Ok(())
            }
            Err(e) => {
                if !matches!(e, ApiError::SessionExpired) {
                    self.lock().notice = Some(format!("Failed to change password: {e}"));
                }
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
