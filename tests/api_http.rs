//! HTTP-level integration tests: the four client-facing scenarios plus
//! status-code mapping and response hygiene, driven through the real router.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use cinder::{
    api::build_router,
    cache::InMemorySecretCache,
    crypto::SecretCipher,
    domain::SecretHandle,
    services::SecretService,
    storage::{AuditSink, SecretStore, SqlxAuditLogRepository, SqlxSecretRepository},
};

use common::test_db::TestDatabase;

struct TestApp {
    server: TestServer,
    cache: Arc<InMemorySecretCache>,
    _db: TestDatabase,
}

async fn test_app() -> TestApp {
    let db = TestDatabase::new("api").await;
    let pool = db.pool.clone();

    let cipher = Arc::new(SecretCipher::from_base64_key(&SecretCipher::generate_key()).unwrap());
    let cache = Arc::new(InMemorySecretCache::new(Duration::from_secs(300)));
    let repository = Arc::new(SqlxSecretRepository::new(pool.clone()));
    let audit: Arc<dyn AuditSink> = Arc::new(SqlxAuditLogRepository::new(pool));

    let service = Arc::new(SecretService::new(cipher, cache.clone(), repository, audit));
    let server = TestServer::new(build_router(service)).unwrap();

    TestApp { server, cache, _db: db }
}

async fn create_secret(server: &TestServer, body: Value) -> String {
    let response = server.post("/secret").json(&body).await;
    response.assert_status_ok();
    response.json::<Value>()["secret_key"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn scenario_store_and_read_once() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "hello", "ttl_seconds": 60 })).await;

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["secret"], "hello");

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scenario_passphrase_guard() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "x", "passphrase": "abc" })).await;

    let response = app
        .server
        .get(&format!("/secret/{}", key))
        .add_query_param("passphrase", "wrong")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get(&format!("/secret/{}", key))
        .add_query_param("passphrase", "abc")
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["secret"], "x");
}

#[tokio::test]
async fn scenario_expiry() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "y", "ttl_seconds": 1 })).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status(StatusCode::GONE);

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scenario_explicit_delete() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "z" })).await;

    let response = app.server.delete(&format!("/secret/{}", key)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "secret_deleted");

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_matching_passphrase() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "z", "passphrase": "abc" })).await;

    let response = app
        .server
        .delete(&format!("/secret/{}", key))
        .add_query_param("passphrase", "wrong")
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .delete(&format!("/secret/{}", key))
        .add_query_param("passphrase", "abc")
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn durable_fallback_uses_secret_db_field() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "deep" })).await;

    // Evict the cache copy so the durable store serves the redemption.
    app.cache.delete(&SecretHandle::from_string(key.clone()), None).await.unwrap();

    let response = app.server.get(&format!("/secret/{}", key)).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["secret_db"], "deep");
    assert!(body.get("secret").is_none());
}

#[tokio::test]
async fn invalid_bodies_are_rejected() {
    let app = test_app().await;

    let response = app.server.post("/secret").json(&json!({ "value": "" })).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response =
        app.server.post("/secret").json(&json!({ "value": "v", "ttl_seconds": -1 })).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_handle_is_not_found() {
    let app = test_app().await;

    let response = app.server.get("/secret/not-a-real-handle").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = app.server.delete("/secret/not-a-real-handle").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_forbid_client_caching() {
    let app = test_app().await;

    let key = create_secret(&app.server, json!({ "value": "nocache" })).await;

    let response = app.server.get(&format!("/secret/{}", key)).await;
    let headers = response.headers();
    let cache_control = headers.get("cache-control").unwrap().to_str().unwrap();
    assert_eq!(cache_control, "no-store, no-cache, must-revalidate");
}

#[tokio::test]
async fn health_endpoint_responds() {
    let app = test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}
