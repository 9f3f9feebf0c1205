//! Integration tests for the API client's cross-capability contract:
//!
//! 1. The bearer credential is attached to every authenticated call.
//! 2. Calls requiring a credential fail before any network I/O without one.
//! 3. A 401 from any capability forces the session store to sign out, and
//!    no later call retries with the stale credential.
//! 4. Non-success responses become typed rejections with the server's
//!    `detail` extracted; missing responses become transport errors.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobdeck::api::ApiClient;
use jobdeck::config::Config;
use jobdeck::errors::ApiError;
use jobdeck::models::{Identity, Registration};
use jobdeck::session::{SessionState, SessionStore};

static COUNTER: AtomicU32 = AtomicU32::new(0);

fn temp_session_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "jobdeck-api-{}-{}-{}.json",
        tag,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}

fn test_config(base: &str, tag: &str) -> Config {
    Config {
        api_url: Url::parse(base).unwrap(),
        session_file: temp_session_file(tag),
        timeout_secs: 5,
    }
}

fn client(base: &str, tag: &str) -> (Arc<SessionStore>, ApiClient) {
    let config = test_config(base, tag);
    let session = Arc::new(SessionStore::restore(config.session_file.clone()));
    let api = ApiClient::new(&config, Arc::clone(&session)).unwrap();
    (session, api)
}

fn signed_in(base: &str, tag: &str, token: &str) -> (Arc<SessionStore>, ApiClient) {
    let (session, api) = client(base, tag);
    session
        .login(token.into(), Identity::default())
        .unwrap();
    (session, api)
}

#[tokio::test]
async fn login_returns_credential_and_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "jwt-1",
            "token_type": "bearer",
            "user": {"username": "revanth", "email": "r@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_session, api) = client(&server.uri(), "login-ok");
    let resp = api.login("r@example.com", "secret").await.unwrap();

    assert_eq!(resp.access_token, "jwt-1");
    assert_eq!(
        resp.user.unwrap().username.as_deref(),
        Some("revanth")
    );
}

#[tokio::test]
async fn authenticated_calls_carry_bearer_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (_session, api) = signed_in(&server.uri(), "bearer", "tok-123");
    let jobs = api.list_jobs().await.unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn missing_credential_fails_without_network_io() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_session, api) = client(&server.uri(), "no-cred");
    let err = api.create_job("Buy milk", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn unauthorized_response_forces_logout_everywhere() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "detail": "Invalid or expired token"
        })))
        .mount(&server)
        .await;
    // The stale credential must never be retried, so the create endpoint
    // can never be reached after the 401.
    Mock::given(method("POST"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (session, api) = signed_in(&server.uri(), "forced-logout", "stale-tok");
    let rx = session.subscribe();

    let err = api.list_jobs().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(!session.is_authenticated());
    assert!(session.credential().is_none());
    assert_eq!(*rx.borrow(), SessionState::SignedOut);

    // Queued work now short-circuits as unauthenticated.
    let err = api.create_job("Buy milk", None).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
}

#[tokio::test]
async fn rejection_detail_is_extracted_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "detail": "Email already exists"
        })))
        .mount(&server)
        .await;

    let (_session, api) = client(&server.uri(), "detail");
    let err = api
        .register(&Registration {
            first_name: "Rev".into(),
            last_name: "G".into(),
            username: "revanth".into(),
            email: "r@example.com".into(),
            mobile: None,
            password: "secret".into(),
        })
        .await
        .unwrap_err();

    match err {
        ApiError::Rejected {
            capability,
            status,
            detail,
        } => {
            assert_eq!(capability, "register");
            assert_eq!(status, 400);
            assert_eq!(detail, "Email already exists");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn rejection_falls_back_to_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream blew up"))
        .mount(&server)
        .await;

    let (_session, api) = signed_in(&server.uri(), "fallback", "tok");
    let err = api.list_jobs().await.unwrap_err();
    match err {
        ApiError::Rejected { status, detail, .. } => {
            assert_eq!(status, 500);
            assert_eq!(detail, "upstream blew up");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn no_response_surfaces_as_transport_error() {
    // Nothing listens on port 1.
    let (_session, api) = signed_in("http://127.0.0.1:1", "transport", "tok");
    let err = api.list_jobs().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}

#[tokio::test]
async fn create_job_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Job created successfully",
            "job": {"id": 7, "title": "Buy milk", "description": "", "status": "TODO"}
        })))
        .mount(&server)
        .await;

    let (_session, api) = signed_in(&server.uri(), "envelope", "tok");
    let job = api.create_job("Buy milk", Some("")).await.unwrap();
    assert_eq!(job.id, 7);
    assert_eq!(job.title, "Buy milk");
}

#[tokio::test]
async fn update_profile_unwraps_user() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/update-profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": {"username": "renamed", "email": "r@example.com"}
        })))
        .mount(&server)
        .await;

    let (_session, api) = signed_in(&server.uri(), "profile", "tok");
    let identity = api
        .update_profile(&Identity {
            username: Some("renamed".into()),
            ..Identity::default()
        })
        .await
        .unwrap();
    assert_eq!(identity.username.as_deref(), Some("renamed"));
}

#[tokio::test]
async fn change_password_accepts_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/change-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Password updated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (_session, api) = signed_in(&server.uri(), "passwd", "tok");
    api.change_password("old-secret", "new-secret").await.unwrap();
}
