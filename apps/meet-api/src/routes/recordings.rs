//! Recording lifecycle endpoints.
//!
//! The capture itself is client-side; these endpoints only drive the state
//! machine and accept the upload-after-stop result as an opaque file
//! reference.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::Recording;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/rooms/{room_id}/recordings",
            post(start_recording).get(list_room_recordings),
        )
        .route("/rooms/{room_id}/recordings/active", get(active_recording))
        .route("/recordings", get(list_recordings))
        .route("/recordings/{recording_id}/stop", post(stop_recording))
        .route(
            "/recordings/{recording_id}/complete",
            post(complete_recording),
        )
        .route(
            "/recordings/{recording_id}",
            axum::routing::delete(delete_recording),
        )
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms/{room_id}/recordings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartRecordingRequest {
    pub user_id: String,
}

/// `POST /api/v1/rooms/{room_id}/recordings` — Start recording.
///
/// An orphaned active recording (previous session never stopped it) is
/// transitioned to failed first; the new recording always starts fresh.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/recordings",
    tag = "Recordings",
    params(("room_id" = String, Path, description = "Room id")),
    request_body = StartRecordingRequest,
    responses(
        (status = 201, description = "Recording started", body = Recording),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn start_recording(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<StartRecordingRequest>,
) -> Result<(StatusCode, Json<Recording>), ApiError> {
    let recording = state
        .service
        .start_recording(&room_id, &body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(recording)))
}

// ---------------------------------------------------------------------------
// POST /api/v1/recordings/{recording_id}/stop
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct StopRecordingRequest {
    pub user_id: String,
}

/// `POST /api/v1/recordings/{recording_id}/stop`
#[utoipa::path(
    post,
    path = "/api/v1/recordings/{recording_id}/stop",
    tag = "Recordings",
    params(("recording_id" = String, Path, description = "Recording id")),
    request_body = StopRecordingRequest,
    responses(
        (status = 200, description = "Recording stopping", body = Recording),
        (status = 400, description = "Recording is not active", body = crate::error::ApiErrorBody),
        (status = 404, description = "Recording not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    Json(body): Json<StopRecordingRequest>,
) -> Result<Json<Recording>, ApiError> {
    let recording = state
        .service
        .stop_recording(&recording_id, &body.user_id)
        .await?;
    Ok(Json(recording))
}

// ---------------------------------------------------------------------------
// POST /api/v1/recordings/{recording_id}/complete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRecordingRequest {
    pub file_url: String,
    pub file_size: u64,
}

/// `POST /api/v1/recordings/{recording_id}/complete` — Upload finished.
#[utoipa::path(
    post,
    path = "/api/v1/recordings/{recording_id}/complete",
    tag = "Recordings",
    params(("recording_id" = String, Path, description = "Recording id")),
    request_body = CompleteRecordingRequest,
    responses(
        (status = 200, description = "Recording completed", body = Recording),
        (status = 400, description = "Recording is not being stopped", body = crate::error::ApiErrorBody),
        (status = 404, description = "Recording not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn complete_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    Json(body): Json<CompleteRecordingRequest>,
) -> Result<Json<Recording>, ApiError> {
    let recording = state
        .service
        .complete_recording(&recording_id, &body.file_url, body.file_size)
        .await?;
    Ok(Json(recording))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/{room_id}/recordings
// ---------------------------------------------------------------------------

/// `GET /api/v1/rooms/{room_id}/recordings` — Newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/recordings",
    tag = "Recordings",
    params(("room_id" = String, Path, description = "Room id")),
    responses((status = 200, description = "Recordings for the room", body = [Recording])),
)]
pub async fn list_room_recordings(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Recording>>, ApiError> {
    Ok(Json(state.service.recordings_for_room(&room_id).await?))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/{room_id}/recordings/active
// ---------------------------------------------------------------------------

/// `GET /api/v1/rooms/{room_id}/recordings/active`
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/recordings/active",
    tag = "Recordings",
    params(("room_id" = String, Path, description = "Room id")),
    responses((status = 200, description = "The active recording, or null")),
)]
pub async fn active_recording(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Option<Recording>>, ApiError> {
    Ok(Json(state.service.active_recording(&room_id).await?))
}

// ---------------------------------------------------------------------------
// GET /api/v1/recordings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListRecordingsParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRecordingsResponse {
    pub recordings: Vec<Recording>,
    pub total: usize,
}

/// `GET /api/v1/recordings` — Paginated list across all rooms.
#[utoipa::path(
    get,
    path = "/api/v1/recordings",
    tag = "Recordings",
    params(
        ("page" = Option<usize>, Query, description = "1-based page, default 1"),
        ("limit" = Option<usize>, Query, description = "Page size, default 20"),
    ),
    responses((status = 200, description = "Recordings", body = ListRecordingsResponse)),
)]
pub async fn list_recordings(
    State(state): State<AppState>,
    Query(params): Query<ListRecordingsParams>,
) -> Result<Json<ListRecordingsResponse>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let (recordings, total) = state.service.list_recordings(page, limit).await?;
    Ok(Json(ListRecordingsResponse { recordings, total }))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/recordings/{recording_id}
// ---------------------------------------------------------------------------

/// `DELETE /api/v1/recordings/{recording_id}`
#[utoipa::path(
    delete,
    path = "/api/v1/recordings/{recording_id}",
    tag = "Recordings",
    params(("recording_id" = String, Path, description = "Recording id")),
    responses(
        (status = 204, description = "Recording deleted"),
        (status = 404, description = "Recording not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn delete_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_recording(&recording_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
