//! Shared helpers for server integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use vent_db::{create_pool, DbRuntimeSettings};
use vent_moderation::ModeratorRoster;
use vent_server::{app, AppState};
use vent_session::SessionStore;

/// A roster member in every test app.
pub const ADMIN: i64 = 100;
/// A second roster member.
pub const ADMIN_2: i64 = 200;

/// Builds an app over a fresh migrated database.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let pool = create_pool(db_path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("failed to create pool");
    {
        let conn = pool.get().expect("failed to get connection");
        vent_db::run_migrations(&conn).expect("failed to run migrations");
    }

    let state = AppState {
        pool,
        roster: Arc::new(ModeratorRoster::new([ADMIN, ADMIN_2])),
        sessions: Arc::new(SessionStore::new()),
    };

    (app(state), temp_dir)
}

/// Sends a request and returns `(status, parsed body)`.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, json)
}

/// Posts one inbound event for a user.
pub async fn send_event(app: &Router, user_id: i64, event: Value) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/events",
        Some(json!({ "userId": user_id, "event": event })),
    )
    .await
}

/// A free-text event payload.
pub fn text(text: &str) -> Value {
    json!({ "kind": "text", "text": text })
}

/// A button-press event payload.
pub fn button(name: &str) -> Value {
    json!({ "kind": "button", "action": { "name": name } })
}

/// A start-comment button-press event payload.
pub fn start_comment(vent_id: &str) -> Value {
    json!({ "kind": "button", "action": { "name": "startComment", "ventId": vent_id } })
}

/// Runs a user through the guided vent flow and returns the vent id
/// (the newest entry in the moderation queue).
pub async fn guided_vent(
    app: &Router,
    user_id: i64,
    vent_text: &str,
    disclosure: &str,
    policy: &str,
) -> String {
    let (status, _) = send_event(app, user_id, button("startVent")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_event(app, user_id, text(vent_text)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_event(app, user_id, button(disclosure)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send_event(app, user_id, button(policy)).await;
    assert_eq!(status, StatusCode::OK, "commit failed: {body}");

    let (status, queue) = request(app, "GET", "/api/moderation/queue?limit=200", None).await;
    assert_eq!(status, StatusCode::OK);
    queue
        .as_array()
        .and_then(|vents| vents.last())
        .and_then(|vent| vent["vent_id"].as_str())
        .expect("queue should contain the new vent")
        .to_string()
}

/// Reviews a vent through the moderation endpoint.
pub async fn review(
    app: &Router,
    vent_id: &str,
    moderator_id: i64,
    decision: &str,
) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/moderation/review",
        Some(json!({
            "ventId": vent_id,
            "moderatorId": moderator_id,
            "decision": decision,
        })),
    )
    .await
}
