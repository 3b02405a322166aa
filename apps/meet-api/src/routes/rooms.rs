//! Room endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::room::RoomSummary;
use crate::models::{Participant, Room};
use crate::rooms::{CreateRoomRequest, JoinOutcome};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room).get(list_rooms))
        .route(
            "/rooms/{room_id}",
            get(get_room).delete(close_room),
        )
        .route("/rooms/{room_id}/join", post(join_room))
        .route("/rooms/{room_id}/participants", get(list_participants))
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms
// ---------------------------------------------------------------------------

/// `POST /api/v1/rooms` — Create a room (and its transport twin).
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = Room),
        (status = 502, description = "Media transport unavailable", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    let room = state.service.create_room(body).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms
// ---------------------------------------------------------------------------

/// `GET /api/v1/rooms` — Active rooms with live participant counts.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    responses((status = 200, description = "Active rooms", body = [RoomSummary])),
)]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomSummary>>, ApiError> {
    Ok(Json(state.service.list_rooms().await?))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/{room_id}
// ---------------------------------------------------------------------------

/// `GET /api/v1/rooms/{room_id}`
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    params(("room_id" = String, Path, description = "Room id")),
    responses(
        (status = 200, description = "The room", body = Room),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, ApiError> {
    Ok(Json(state.service.get_room(&room_id).await?))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/rooms/{room_id}
// ---------------------------------------------------------------------------

/// `DELETE /api/v1/rooms/{room_id}` — Close a room.
#[utoipa::path(
    delete,
    path = "/api/v1/rooms/{room_id}",
    tag = "Rooms",
    params(("room_id" = String, Path, description = "Room id")),
    responses(
        (status = 204, description = "Room closed"),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn close_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.close_room(&room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /api/v1/rooms/{room_id}/join
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRoomRequest {
    /// Omitted for guests; a fresh user id is generated.
    #[serde(default)]
    pub user_id: Option<String>,
    pub display_name: String,
}

/// `POST /api/v1/rooms/{room_id}/join` — Join and fetch a transport token.
///
/// The same admission path the gateway uses; HTTP join exists so a client
/// can fetch its transport credential before opening the socket.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{room_id}/join",
    tag = "Rooms",
    params(("room_id" = String, Path, description = "Room id")),
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Admitted", body = JoinOutcome),
        (status = 400, description = "Room locked or full", body = crate::error::ApiErrorBody),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn join_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Json(body): Json<JoinRoomRequest>,
) -> Result<Json<JoinOutcome>, ApiError> {
    let user_id = body
        .user_id
        .unwrap_or_else(|| meet_common::id::prefixed_ulid(meet_common::id::prefix::USER));
    let outcome = state
        .service
        .join(&room_id, &user_id, &body.display_name)
        .await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// GET /api/v1/rooms/{room_id}/participants
// ---------------------------------------------------------------------------

/// `GET /api/v1/rooms/{room_id}/participants` — Live roster.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/participants",
    tag = "Rooms",
    params(("room_id" = String, Path, description = "Room id")),
    responses(
        (status = 200, description = "Active participants", body = [Participant]),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    Ok(Json(state.service.roster(&room_id).await?))
}
