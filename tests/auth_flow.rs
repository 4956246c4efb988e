//! Integration tests for sign-up, sign-in, session restore, and sign-out
//! against a mock identity service.

use newsman::auth::{AuthContext, AuthError, AuthPhase, IdentityClient, SessionStore, SIGN_UP_SUCCESS_MESSAGE};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::path::PathBuf;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "public-anon-key";

fn identity_for(server: &MockServer) -> IdentityClient {
    IdentityClient::new(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        SecretString::from(ANON_KEY.to_string()),
    )
}

fn session_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("newsman_auth_flow_{name}.json"));
    std::fs::remove_file(&path).ok();
    path
}

fn token_body(access: &str, expires_at: Option<i64>) -> Value {
    let mut body = json!({
        "access_token": access,
        "refresh_token": format!("refresh-{access}"),
        "token_type": "bearer",
        "user": {"id": "user-1", "email": "reader@example.com"}
    });
    match expires_at {
        Some(at) => body["expires_at"] = json!(at),
        None => body["expires_in"] = json!(3600),
    }
    body
}

async fn mount_password_grant(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn signed_in_context(server: &MockServer, store_path: &PathBuf) -> AuthContext {
    let mut ctx = AuthContext::new(Some(identity_for(server)), SessionStore::new(store_path));
    ctx.init().await.unwrap();
    ctx.sign_in("reader@example.com", "hunter22").await.unwrap();
    ctx
}

// ============================================================================
// Sign up
// ============================================================================

#[tokio::test]
async fn test_sign_up_sends_credentials_and_anon_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .and(header("apikey", ANON_KEY))
        .and(body_json(json!({"email": "new@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-2"})))
        .expect(1)
        .mount(&server)
        .await;

    let message = identity_for(&server)
        .sign_up("new@example.com", "hunter22")
        .await
        .unwrap();
    assert_eq!(message, SIGN_UP_SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_sign_up_rejection_carries_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"code": 422, "msg": "Password should be at least 6 characters"})),
        )
        .mount(&server)
        .await;

    let err = identity_for(&server)
        .sign_up("new@example.com", "abc")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 422, .. }));
    assert_eq!(err.to_string(), "Password should be at least 6 characters");
}

// ============================================================================
// Sign in / restore
// ============================================================================

#[tokio::test]
async fn test_sign_in_persists_session_for_next_start() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("access-1", None)).await;
    let store_path = session_path("persist");

    let mut ctx = signed_in_context(&server, &store_path).await;
    assert_eq!(ctx.user().map(|u| u.id.as_str()), Some("user-1"));
    assert!(store_path.exists());
    ctx.tear_down();

    let mut restored = AuthContext::new(Some(identity_for(&server)), SessionStore::new(&store_path));
    restored.init().await.unwrap();
    assert_eq!(restored.phase(), AuthPhase::Active);
    let session = restored.session().unwrap();
    assert_eq!(session.display_name(), "reader@example.com");

    std::fs::remove_file(&store_path).ok();
}

#[tokio::test]
async fn test_bad_credentials_leave_no_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
        ))
        .mount(&server)
        .await;
    let store_path = session_path("bad_credentials");

    let mut ctx = AuthContext::new(Some(identity_for(&server)), SessionStore::new(&store_path));
    ctx.init().await.unwrap();
    let err = ctx.sign_in("reader@example.com", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid login credentials");
    assert!(ctx.session().is_none());
    assert!(!store_path.exists());
}

#[tokio::test]
async fn test_expired_session_is_refreshed_on_init() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("stale", Some(1))).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_json(json!({"refresh_token": "refresh-stale"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh", None)))
        .expect(1)
        .mount(&server)
        .await;
    let store_path = session_path("refresh");

    signed_in_context(&server, &store_path).await.tear_down();

    let mut ctx = AuthContext::new(Some(identity_for(&server)), SessionStore::new(&store_path));
    ctx.init().await.unwrap();
    let session = ctx.session().unwrap();
    assert!(!session.is_expired(chrono::Utc::now()));

    std::fs::remove_file(&store_path).ok();
}

#[tokio::test]
async fn test_expired_session_dropped_when_refresh_fails() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("stale", Some(1))).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"msg": "Invalid Refresh Token"})))
        .mount(&server)
        .await;
    let store_path = session_path("refresh_fails");

    signed_in_context(&server, &store_path).await.tear_down();

    let mut ctx = AuthContext::new(Some(identity_for(&server)), SessionStore::new(&store_path));
    ctx.init().await.unwrap();
    assert!(ctx.session().is_none());
    assert!(!store_path.exists());
}

// ============================================================================
// Sign out
// ============================================================================

#[tokio::test]
async fn test_sign_out_revokes_with_user_token() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("access-9", None)).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer access-9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let store_path = session_path("sign_out");

    let mut ctx = signed_in_context(&server, &store_path).await;
    ctx.sign_out().await.unwrap();

    assert!(ctx.session().is_none());
    assert!(!store_path.exists());
}

#[tokio::test]
async fn test_sign_out_clears_locally_when_service_fails() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("access-3", None)).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let store_path = session_path("sign_out_fails");

    let mut ctx = signed_in_context(&server, &store_path).await;
    ctx.sign_out().await.unwrap();

    assert!(ctx.session().is_none());
    assert!(!store_path.exists());
    assert_eq!(ctx.phase(), AuthPhase::Active);
}

#[tokio::test]
async fn test_local_sign_out_defers_revoke() {
    let server = MockServer::start().await;
    mount_password_grant(&server, token_body("access-7", None)).await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .and(header("authorization", "Bearer access-7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let store_path = session_path("local_sign_out");

    let mut ctx = signed_in_context(&server, &store_path).await;
    let revoke = ctx.sign_out_local().unwrap().expect("a session to revoke");

    // Gone locally before the service has been called
    assert!(ctx.session().is_none());
    assert!(!store_path.exists());
    assert!(server.received_requests().await.unwrap().iter().all(|r| r.url.path() != "/auth/v1/logout"));

    revoke.run().await;
    assert!(ctx.sign_out_local().unwrap().is_none());
}

// ============================================================================
// Response limits
// ============================================================================

#[tokio::test]
async fn test_oversized_identity_response_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/signup"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 10 * 1024 * 1024 + 1]))
        .mount(&server)
        .await;

    let err = identity_for(&server)
        .sign_up("new@example.com", "hunter22")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::ResponseTooLarge(_)));
}
