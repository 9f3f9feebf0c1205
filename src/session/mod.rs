//! Session store — the authenticated identity carried across requests.
//!
//! Holds the bearer credential and the user's profile, persists both to a
//! JSON file so a restart resumes the session, and broadcasts sign-in /
//! sign-out transitions over a watch channel. Dependents subscribe instead
//! of polling: the shell switches views on the signal, the job board uses
//! it to flush the previous user's jobs.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::models::Identity;

/// Snapshot broadcast to subscribers on every transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SignedOut,
    SignedIn(Identity),
}

/// On-disk shape. The keys are fixed: `token` and `user`.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    #[serde(default)]
    user: Identity,
}

struct Inner {
    token: Option<String>,
    identity: Identity,
}

pub struct SessionStore {
    inner: Mutex<Inner>,
    path: PathBuf,
    tx: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Restore a previously persisted session. Absent or malformed state is
    /// treated as signed-out; this never fails.
    pub fn restore(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let inner = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<PersistedSession>(&bytes) {
                Ok(saved) => {
                    debug!(path = %path.display(), "restored persisted session");
                    Inner {
                        token: Some(saved.token),
                        identity: saved.user,
                    }
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "persisted session unreadable, starting signed out"
                    );
                    Inner {
                        token: None,
                        identity: Identity::default(),
                    }
                }
            },
            Err(_) => Inner {
                token: None,
                identity: Identity::default(),
            },
        };

        let state = match &inner.token {
            Some(_) => SessionState::SignedIn(inner.identity.clone()),
            None => SessionState::SignedOut,
        };
        let (tx, _) = watch::channel(state);

        Self {
            inner: Mutex::new(inner),
            path,
            tx,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().token.is_some()
    }

    /// Current bearer credential, if signed in.
    pub fn credential(&self) -> Option<String> {
        self.lock().token.clone()
    }

    pub fn identity(&self) -> Identity {
        self.lock().identity.clone()
    }

    /// Subscribe to sign-in / sign-out transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Persist and adopt a freshly issued credential. Signals `SignedIn`,
    /// which the shell treats as "go to the task view".
    pub fn login(&self, token: String, identity: Identity) -> anyhow::Result<()> {
        self.persist(&PersistedSession {
            token: token.clone(),
            user: identity.clone(),
        })?;
        {
            let mut inner = self.lock();
            inner.token = Some(token);
            inner.identity = identity.clone();
        }
        let _ = self.tx.send(SessionState::SignedIn(identity));
        Ok(())
    }

    /// Drop the session everywhere: persisted file, memory, subscribers.
    ///
    /// The single exit path — user-initiated logout and server-side
    /// credential rejection both land here, so a session the server has
    /// already invalidated can never be reused.
    pub fn logout(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not remove persisted session"
                );
            }
        }
        {
            let mut inner = self.lock();
            inner.token = None;
            inner.identity = Identity::default();
        }
        let _ = self.tx.send(SessionState::SignedOut);
    }

    /// Replace the profile without touching the credential.
    pub fn update_identity(&self, identity: Identity) -> anyhow::Result<()> {
        let token = {
            let mut inner = self.lock();
            inner.identity = identity.clone();
            inner.token.clone()
        };
        if let Some(token) = token {
            self.persist(&PersistedSession {
                token,
                user: identity.clone(),
            })?;
            let _ = self.tx.send(SessionState::SignedIn(identity));
        }
        Ok(())
    }

    fn persist(&self, session: &PersistedSession) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
