//! Typed client for the task-tracking service's HTTP surface.
//!
//! One method per remote capability. Every authenticated call reads the
//! bearer credential from the shared session store at dispatch time; a 401
//! from any capability forces `SessionStore::logout()` before the error is
//! returned, so every screen reacts to session loss the same way.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{
    Ack, Identity, Job, JobEnvelope, JobPatch, JobStatus, LoginRequest, LoginResponse,
    PasswordChange, Registration, UserEnvelope,
};
use crate::session::SessionStore;

pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(concat!("jobdeck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base: config.api_url.clone(),
            session,
        })
    }

    // ── Auth capabilities ─────────────────────────────────────

    pub async fn register(&self, registration: &Registration) -> Result<Identity, ApiError> {
        let req = self
            .request(Method::POST, "/auth/register")
            .json(registration);
        let resp = self.send("register", req).await?;
        self.parse("register", resp).await
    }

    /// Exchange email + password for a bearer credential. The caller hands
    /// the result to `SessionStore::login`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let req = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let resp = self.send("login", req).await?;
        self.parse("login", resp).await
    }

    /// Submit the full identity; returns the server's confirmed copy.
    pub async fn update_profile(&self, identity: &Identity) -> Result<Identity, ApiError> {
        let req = self
            .authed(Method::PUT, "/auth/update-profile")?
            .json(identity);
        let resp = self.send("update-profile", req).await?;
        let envelope: UserEnvelope = self.parse("update-profile", resp).await?;
        Ok(envelope.user)
    }

    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let req = self
            .authed(Method::POST, "/auth/change-password")?
            .json(&PasswordChange { old, new });
        let resp = self.send("change-password", req).await?;
        let _: Ack = self.parse("change-password", resp).await?;
        Ok(())
    }

    // ── Job capabilities ──────────────────────────────────────

    /// Full job list for the current session, newest first (ordering owned
    /// by the server).
    pub async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let req = self.authed(Method::GET, "/jobs/")?;
        let resp = self.send("list-jobs", req).await?;
        self.parse("list-jobs", resp).await
    }

    pub async fn create_job(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Job, ApiError> {
        let req = self.authed(Method::POST, "/jobs/")?.json(&serde_json::json!({
            "title": title,
            "description": description,
        }));
        let resp = self.send("create-job", req).await?;
        let envelope: JobEnvelope = self.parse("create-job", resp).await?;
        Ok(envelope.job)
    }

    pub async fn update_job(&self, id: u64, patch: &JobPatch) -> Result<Job, ApiError> {
        let req = self.authed(Method::PUT, &format!("/jobs/{id}"))?.json(patch);
        let resp = self.send("update-job", req).await?;
        let envelope: JobEnvelope = self.parse("update-job", resp).await?;
        Ok(envelope.job)
    }

    pub async fn update_job_status(&self, id: u64, status: JobStatus) -> Result<Job, ApiError> {
        let req = self
            .authed(Method::PUT, &format!("/jobs/{id}/status"))?
            .json(&serde_json::json!({ "status": status }));
        let resp = self.send("update-job-status", req).await?;
        let envelope: JobEnvelope = self.parse("update-job-status", resp).await?;
        Ok(envelope.job)
    }

    pub async fn delete_job(&self, id: u64) -> Result<(), ApiError> {
        let req = self.authed(Method::DELETE, &format!("/jobs/{id}"))?;
        let resp = self.send("delete-job", req).await?;
        let _: Ack = self.parse("delete-job", resp).await?;
        Ok(())
    }

    // ── Plumbing ──────────────────────────────────────────────

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base.as_str().trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    /// Like `request`, but requires a credential and attaches it as a
    /// bearer header. Fails with `Unauthenticated` before any network I/O.
    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self
            .session
            .credential()
            .ok_or(ApiError::Unauthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    /// Dispatch and normalize failures into the shared taxonomy. A 401
    /// additionally forces a logout so dependents see the session end no
    /// matter which capability tripped it.
    async fn send(
        &self,
        capability: &'static str,
        req: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let resp = req.send().await.map_err(|source| {
            warn!(capability, error = %source, "no response from server");
            ApiError::Transport { capability, source }
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(capability, "credential rejected by server, signing out");
            self.session.logout();
            return Err(ApiError::SessionExpired);
        }
        if !status.is_success() {
            let detail = extract_detail(resp).await;
            return Err(ApiError::Rejected {
                capability,
                status: status.as_u16(),
                detail,
            });
        }

        debug!(capability, status = status.as_u16(), "capability succeeded");
        Ok(resp)
    }

    async fn parse<T: DeserializeOwned>(
        &self,
        capability: &'static str,
        resp: Response,
    ) -> Result<T, ApiError> {
        let status = resp.status().as_u16();
        let bytes = resp
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { capability, source })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Rejected {
            capability,
            status,
            detail: format!("unexpected response body: {e}"),
        })
    }
}

/// Pull a human-readable reason out of an error body. The service reports
/// failures as `{"detail": "..."}`; anything else falls back to the raw
/// text or a generic message.
async fn extract_detail(resp: Response) -> String {
    let body = resp.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    if body.trim().is_empty() {
        "request rejected".to_string()
    } else {
        body
    }
}
