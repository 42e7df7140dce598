//! End-to-end tests for the session HTTP API over the in-memory store.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::json;

use cinematch_back::{
    dao::session_store::memory::MemorySessionStore,
    routes,
    state::AppState,
};

const TEST_TOKEN: &str = "test-credential";

async fn create_test_server() -> TestServer {
    let state = AppState::new(TEST_TOKEN);
    state
        .set_session_store(Arc::new(MemorySessionStore::new()))
        .await;
    let app = routes::router(state);
    TestServer::new(app).unwrap()
}

/// Server whose storage never connected; every session call must 503.
fn create_degraded_server() -> TestServer {
    let state = AppState::new(TEST_TOKEN);
    let app = routes::router(state);
    TestServer::new(app).unwrap()
}

fn user(id: &str, username: &str) -> serde_json::Value {
    json!({
        "id": id,
        "username": username,
        "genres": ["sci-fi"],
        "vibe": "cozy"
    })
}

#[tokio::test]
async fn test_healthcheck_is_open_and_reports_ok() {
    let server = create_test_server().await;

    let response = server.get("/healthcheck").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_healthcheck_reports_degraded_without_storage() {
    let server = create_degraded_server();

    let response = server.get("/healthcheck").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn test_session_routes_require_bearer_token() {
    let server = create_test_server().await;

    // Missing credential
    let response = server
        .post("/sessions/create")
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);

    // Wrong credential
    let response = server
        .get("/sessions/AB12CD")
        .authorization_bearer("wrong")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_session_seeds_creator_preferences() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": " ab-12cd ", "user": user("u1", "Ada")}))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body.get("error").is_none());

    let session = &body["session"];
    assert_eq!(session["code"], "AB12CD");
    assert!(session["createdAt"].is_i64());
    assert_eq!(session["users"].as_array().unwrap().len(), 1);
    assert_eq!(session["users"][0]["username"], "Ada");
    assert_eq!(session["preferences"]["u1"], json!([]));
}

#[tokio::test]
async fn test_create_session_rejects_malformed_code() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12", "user": user("u1", "Ada")}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_session_rejects_empty_username() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "")}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_session_appends_member_idempotently() {
    let server = create_test_server().await;
    server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await
        .assert_status_ok();

    // New member joins with a lowercase code
    let response = server
        .post("/sessions/join")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "ab12cd", "user": user("u2", "Grace")}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["session"]["preferences"]["u2"], json!([]));

    // Populate u2's preferences, then rejoin: no duplicate, no reset
    server
        .post("/sessions/AB12CD/preferences")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"userId": "u2", "movieIds": [42]}))
        .await
        .assert_status_ok();

    let response = server
        .post("/sessions/join")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u2", "Grace")}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["users"].as_array().unwrap().len(), 2);
    assert_eq!(body["session"]["preferences"]["u2"], json!([42]));
}

#[tokio::test]
async fn test_join_unknown_code_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/join")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "ZZZZZZ", "user": user("u1", "Ada")}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_join_malformed_code_is_rejected_before_lookup() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/join")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "!!", "user": user("u1", "Ada")}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_session_normalizes_path_code() {
    let server = create_test_server().await;
    server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await
        .assert_status_ok();

    let response = server
        .get("/sessions/ab12cd")
        .authorization_bearer(TEST_TOKEN)
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["code"], "AB12CD");
}

#[tokio::test]
async fn test_get_unknown_session_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .get("/sessions/ZZZZZZ")
        .authorization_bearer(TEST_TOKEN)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_preferences_dedupes_and_replaces() {
    let server = create_test_server().await;
    server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await
        .assert_status_ok();

    // Duplicates collapse
    let response = server
        .post("/sessions/AB12CD/preferences")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"userId": "u1", "movieIds": [5, 5, 9]}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["preferences"]["u1"], json!([5, 9]));

    // Full replacement, not a merge
    let response = server
        .post("/sessions/AB12CD/preferences")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"userId": "u1", "movieIds": [7]}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["preferences"]["u1"], json!([7]));
}

#[tokio::test]
async fn test_update_preferences_unknown_session_is_not_found() {
    let server = create_test_server().await;

    let response = server
        .post("/sessions/ZZZZZZ/preferences")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"userId": "u1", "movieIds": [1]}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_preferences_requires_user_id() {
    let server = create_test_server().await;
    server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await
        .assert_status_ok();

    let response = server
        .post("/sessions/AB12CD/preferences")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"userId": "", "movieIds": [1]}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_session_degraded_storage_is_service_unavailable() {
    let server = create_degraded_server();

    let response = server
        .post("/sessions/create")
        .authorization_bearer(TEST_TOKEN)
        .json(&json!({"code": "AB12CD", "user": user("u1", "Ada")}))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}
