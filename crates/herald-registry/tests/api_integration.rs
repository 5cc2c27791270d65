//! API integration tests for herald-registry.
//!
//! These tests exercise the REST API through axum's tower service interface
//! (no TCP) on the in-memory token store.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use herald_common::auth::{Claims, JwtContext};
use herald_common::payload::PushMessage;
use herald_common::{Platform, Role};
use herald_registry::push::{PushError, PushSender};
use herald_registry::state::AppState;
use herald_registry::store::{MemoryTokenStore, StoreError, TokenBinding, TokenStore, Upsert};

const ISSUER: &str = "herald-registry";

/// Records every push; tokens listed in `reject` fail.
#[derive(Default)]
struct RecordingPush {
    sent: Mutex<Vec<(String, PushMessage)>>,
    reject: Mutex<Vec<String>>,
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, device_token: &str, message: &PushMessage) -> Result<(), PushError> {
        if self.reject.lock().unwrap().iter().any(|t| t == device_token) {
            return Err(PushError::Unregistered);
        }
        self.sent
            .lock()
            .unwrap()
            .push((device_token.to_string(), message.clone()));
        Ok(())
    }
}

/// A store whose database is always unreachable.
struct UnavailableStore;

#[async_trait]
impl TokenStore for UnavailableStore {
    async fn upsert(&self, _: &str, _: Role, _: &str, _: Platform) -> Result<Upsert, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn remove(&self, _: &str, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }

    async fn tokens_for(&self, _: &str) -> Result<Vec<TokenBinding>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

struct TestApp {
    app: Router,
    jwt: Arc<JwtContext>,
    store: Arc<MemoryTokenStore>,
    push: Arc<RecordingPush>,
}

impl TestApp {
    fn new() -> Self {
        let (jwt, seed) = JwtContext::generate(ISSUER);
        let store = Arc::new(MemoryTokenStore::new());
        let push = Arc::new(RecordingPush::default());
        let state = AppState::new(jwt, store.clone(), push.clone());

        let app = Router::new()
            .nest("/api", herald_registry::api::router())
            .with_state(state);

        // A second context over the same key signs the test credentials.
        let signer = JwtContext::from_ed25519_seed(&seed, ISSUER).unwrap();
        Self {
            app,
            jwt: Arc::new(signer),
            store,
            push,
        }
    }

    fn credential(&self, sub: &str, role: Role) -> String {
        self.jwt
            .create_token(&Claims::new(sub, role, ISSUER, 3600))
            .unwrap()
    }

    async fn call(&self, req: axum::http::Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(req).await.unwrap()
    }
}

/// Helper: parse JSON response body.
async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&bytes);
        panic!("not valid JSON: {text}");
    })
}

/// Helper: build a request with auth header and optional JSON body.
fn auth_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .uri(uri)
        .method(method)
        .header("authorization", format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn auth_post(uri: &str, token: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    auth_request("POST", uri, token, Some(body))
}

fn auth_delete(uri: &str, token: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    auth_request("DELETE", uri, token, Some(body))
}

fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({ "token": token, "platform": "web" })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_requires_authorization() {
    let t = TestApp::new();
    let req = axum::http::Request::builder()
        .uri("/api/fcm-tokens/save")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&token_body("tok-1")).unwrap()))
        .unwrap();

    let resp = t.call(req).await;
    assert_eq!(resp.status(), 401);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "missing authorization header");
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn save_rejects_foreign_credential() {
    let t = TestApp::new();
    let (other, _) = JwtContext::generate(ISSUER);
    let forged = other
        .create_token(&Claims::new("usr_1", Role::Admin, ISSUER, 3600))
        .unwrap();

    let resp = t
        .call(auth_post("/api/fcm-tokens/save", &forged, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 401);
    assert_eq!(json_body(resp).await["message"], "invalid or expired token");
}

#[tokio::test]
async fn save_rejects_expired_credential() {
    let t = TestApp::new();
    let expired = t
        .jwt
        .create_token(&Claims::new("usr_1", Role::Admin, ISSUER, -3600))
        .unwrap();

    let resp = t
        .call(auth_post("/api/fcm-tokens/save", &expired, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 401);
}

// ── Save ────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_binds_token_to_caller() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Sales);

    let resp = t
        .call(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await["message"], "token saved");

    let bound = t.store.tokens_for("usr_1").await.unwrap();
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].device_token, "tok-1");
    assert_eq!(bound[0].owner_role, Role::Sales);
}

#[tokio::test]
async fn save_is_idempotent() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Admin);

    t.call(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await;
    let resp = t
        .call(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await;

    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await["message"], "token updated");
    assert_eq!(t.store.len(), 1);
}

#[tokio::test]
async fn save_rejects_empty_token() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Admin);

    let resp = t
        .call(auth_post("/api/fcm-tokens/save", &bearer, token_body("  ")))
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(json_body(resp).await["message"], "token is required");
}

#[tokio::test]
async fn save_rejects_unknown_platform_with_message_body() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Admin);

    let resp = t
        .call(auth_post(
            "/api/fcm-tokens/save",
            &bearer,
            serde_json::json!({ "token": "tok-1", "platform": "fax" }),
        ))
        .await;
    assert_eq!(resp.status(), 400);
    assert!(json_body(resp).await["message"].is_string());
    assert!(t.store.is_empty());
}

// ── Remove ──────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_drops_binding() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Employee);
    t.call(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await;

    let resp = t
        .call(auth_delete("/api/fcm-tokens/remove", &bearer, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await["message"], "token removed");
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn remove_unknown_token_is_not_found() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Employee);

    let resp = t
        .call(auth_delete("/api/fcm-tokens/remove", &bearer, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn remove_cannot_touch_another_identity() {
    let t = TestApp::new();
    let owner = t.credential("usr_1", Role::Client);
    let other = t.credential("usr_2", Role::Client);
    t.call(auth_post("/api/fcm-tokens/save", &owner, token_body("tok-1")))
        .await;

    let resp = t
        .call(auth_delete("/api/fcm-tokens/remove", &other, token_body("tok-1")))
        .await;
    assert_eq!(resp.status(), 404);
    assert_eq!(t.store.len(), 1);
}

// ── Test notification ───────────────────────────────────────────────

#[tokio::test]
async fn test_push_reaches_every_device_of_caller() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Pm);
    let stranger = t.credential("usr_2", Role::Pm);
    for token in ["tok-1", "tok-2"] {
        t.call(auth_post("/api/fcm-tokens/save", &bearer, token_body(token)))
            .await;
    }
    t.call(auth_post("/api/fcm-tokens/save", &stranger, token_body("tok-3")))
        .await;

    let resp = t
        .call(auth_request("POST", "/api/fcm-tokens/test", &bearer, None))
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await["delivered"], 2);

    let sent = t.push.sent.lock().unwrap();
    let mut targets: Vec<&str> = sent.iter().map(|(token, _)| token.as_str()).collect();
    targets.sort();
    assert_eq!(targets, ["tok-1", "tok-2"]);
    assert!(sent.iter().all(|(_, msg)| msg.kind() == "test"));
}

#[tokio::test]
async fn test_push_without_devices_is_not_found() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Pm);

    let resp = t
        .call(auth_request("POST", "/api/fcm-tokens/test", &bearer, None))
        .await;
    assert_eq!(resp.status(), 404);
    assert_eq!(json_body(resp).await["message"], "no registered device tokens");
}

#[tokio::test]
async fn test_push_counts_only_successful_deliveries() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::ChannelPartner);
    for token in ["tok-1", "tok-2"] {
        t.call(auth_post("/api/fcm-tokens/save", &bearer, token_body(token)))
            .await;
    }
    t.push.reject.lock().unwrap().push("tok-2".into());

    let resp = t
        .call(auth_request("POST", "/api/fcm-tokens/test", &bearer, None))
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(json_body(resp).await["delivered"], 1);
}

#[tokio::test]
async fn test_push_fails_when_nothing_delivered() {
    let t = TestApp::new();
    let bearer = t.credential("usr_1", Role::Admin);
    t.call(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await;
    t.push.reject.lock().unwrap().push("tok-1".into());

    let resp = t
        .call(auth_request("POST", "/api/fcm-tokens/test", &bearer, None))
        .await;
    assert_eq!(resp.status(), 502);
    assert_eq!(json_body(resp).await["message"], "push delivery failed");
}

// ── Store failures ──────────────────────────────────────────────────

#[tokio::test]
async fn store_failure_is_reported_as_db_error() {
    let (jwt, _) = JwtContext::generate(ISSUER);
    let bearer = jwt
        .create_token(&Claims::new("usr_1", Role::Admin, ISSUER, 3600))
        .unwrap();
    let state = AppState::new(jwt, Arc::new(UnavailableStore), Arc::new(RecordingPush::default()));
    let app = Router::new()
        .nest("/api", herald_registry::api::router())
        .with_state(state);

    let resp = app
        .clone()
        .oneshot(auth_post("/api/fcm-tokens/save", &bearer, token_body("tok-1")))
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(json_body(resp).await, serde_json::json!({ "message": "db error" }));

    let resp = app
        .oneshot(auth_request("POST", "/api/fcm-tokens/test", &bearer, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(json_body(resp).await["message"], "db error");
}
