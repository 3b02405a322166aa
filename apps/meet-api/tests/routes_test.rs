mod common;

use axum_test::TestServer;
use common::{build_state, TestContext};
use http::StatusCode;
use serde_json::{json, Value};

fn server(ctx: &TestContext) -> TestServer {
    let app = meet_api::routes::router().with_state(ctx.state.clone());
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn health_is_ok() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_join_and_list_rooms() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let created = server
        .post("/api/v1/rooms")
        .json(&json!({
            "name": "Standup",
            "max_participants": 3,
            "host_id": "h"
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let room: Value = created.json();
    let room_id = room["id"].as_str().unwrap().to_string();

    let joined = server
        .post(&format!("/api/v1/rooms/{room_id}/join"))
        .json(&json!({ "user_id": "h", "display_name": "Hannah" }))
        .await;
    joined.assert_status_ok();
    let outcome: Value = joined.json();
    assert_eq!(outcome["participant"]["role"], "HOST");
    assert!(!outcome["transport_token"].as_str().unwrap().is_empty());
    assert_eq!(outcome["participants"].as_array().unwrap().len(), 1);

    let listed = server.get("/api/v1/rooms").await;
    listed.assert_status_ok();
    let rooms: Value = listed.json();
    assert_eq!(rooms.as_array().unwrap().len(), 1);
    assert_eq!(rooms[0]["room"]["id"], room_id.as_str());
    assert_eq!(rooms[0]["participant_count"], 1);
}

#[tokio::test]
async fn full_room_is_rejected_with_a_structured_error() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let created = server
        .post("/api/v1/rooms")
        .json(&json!({ "name": "Tiny", "max_participants": 1, "host_id": "h" }))
        .await;
    let room: Value = created.json();
    let room_id = room["id"].as_str().unwrap().to_string();

    server
        .post(&format!("/api/v1/rooms/{room_id}/join"))
        .json(&json!({ "user_id": "h", "display_name": "Hannah" }))
        .await
        .assert_status_ok();

    let rejected = server
        .post(&format!("/api/v1/rooms/{room_id}/join"))
        .json(&json!({ "user_id": "b", "display_name": "Bob" }))
        .await;
    rejected.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = rejected.json();
    assert_eq!(body["error"]["code"], "ROOM_FULL");
}

#[tokio::test]
async fn unknown_room_is_404() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let response = server.get("/api/v1/rooms/room_missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "ROOM_NOT_FOUND");
}

#[tokio::test]
async fn recording_lifecycle_over_http() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let created = server
        .post("/api/v1/rooms")
        .json(&json!({ "name": "Recorded", "host_id": "h" }))
        .await;
    let room: Value = created.json();
    let room_id = room["id"].as_str().unwrap().to_string();

    let started = server
        .post(&format!("/api/v1/rooms/{room_id}/recordings"))
        .json(&json!({ "user_id": "h" }))
        .await;
    started.assert_status(StatusCode::CREATED);
    let recording: Value = started.json();
    let recording_id = recording["id"].as_str().unwrap().to_string();
    assert_eq!(recording["status"], "active");

    let active = server
        .get(&format!("/api/v1/rooms/{room_id}/recordings/active"))
        .await;
    active.assert_status_ok();
    let active: Value = active.json();
    assert_eq!(active["id"], recording_id.as_str());

    let stopped = server
        .post(&format!("/api/v1/recordings/{recording_id}/stop"))
        .json(&json!({ "user_id": "h" }))
        .await;
    stopped.assert_status_ok();

    let completed = server
        .post(&format!("/api/v1/recordings/{recording_id}/complete"))
        .json(&json!({ "file_url": "/files/a.webm", "file_size": 42 }))
        .await;
    completed.assert_status_ok();
    let completed: Value = completed.json();
    assert_eq!(completed["status"], "completed");

    // Stopping again is an invalid state transition.
    let again = server
        .post(&format!("/api/v1/recordings/{recording_id}/stop"))
        .json(&json!({ "user_id": "h" }))
        .await;
    again.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = again.json();
    assert_eq!(body["error"]["code"], "INVALID_STATE");
}

#[tokio::test]
async fn audit_log_records_privileged_actions() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let created = server
        .post("/api/v1/rooms")
        .json(&json!({ "name": "Audited", "host_id": "h" }))
        .await;
    let room: Value = created.json();
    let room_id = room["id"].as_str().unwrap().to_string();

    server
        .post(&format!("/api/v1/rooms/{room_id}/join"))
        .json(&json!({ "user_id": "h", "display_name": "Hannah" }))
        .await
        .assert_status_ok();

    let log = server
        .get(&format!("/api/v1/rooms/{room_id}/audit-log"))
        .await;
    log.assert_status_ok();
    let body: Value = log.json();
    let actions: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"JOIN_ROOM"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let ctx = build_state(&[]);
    let server = server(&ctx);

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/v1/rooms"].is_object());
}
