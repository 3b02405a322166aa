pub mod audit_log;
pub mod health;
pub mod recordings;
pub mod rooms;

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .route("/api-docs/openapi.json", get(openapi))
        .nest(
            "/api/v1",
            rooms::router()
                .merge(recordings::router())
                .merge(audit_log::router()),
        )
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Rooms
        rooms::create_room,
        rooms::list_rooms,
        rooms::get_room,
        rooms::close_room,
        rooms::join_room,
        rooms::list_participants,
        // Recordings
        recordings::start_recording,
        recordings::stop_recording,
        recordings::complete_recording,
        recordings::list_room_recordings,
        recordings::active_recording,
        recordings::list_recordings,
        recordings::delete_recording,
        // Audit Log
        audit_log::list_audit_log,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            // Models
            crate::models::Room,
            crate::models::room::RoomSummary,
            crate::models::Participant,
            crate::models::Role,
            crate::models::Recording,
            crate::models::RecordingStatus,
            crate::models::AuditLogEntry,
            // Route request/response types
            health::HealthResponse,
            crate::rooms::service::CreateRoomRequest,
            crate::rooms::service::JoinOutcome,
            rooms::JoinRoomRequest,
            recordings::StartRecordingRequest,
            recordings::StopRecordingRequest,
            recordings::CompleteRecordingRequest,
            recordings::ListRecordingsResponse,
            audit_log::AuditLogResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Rooms", description = "Room lifecycle and membership"),
        (name = "Recordings", description = "Recording lifecycle"),
        (name = "Audit Log", description = "Privileged-action audit trail"),
    )
)]
pub struct ApiDoc;
