//! Audit log read path, consumed by the reporting layer.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::AuditLogEntry;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/rooms/{room_id}/audit-log", get(list_audit_log))
}

#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    pub data: Vec<AuditLogEntry>,
    pub limit: usize,
    pub offset: usize,
}

/// `GET /api/v1/rooms/{room_id}/audit-log` — Newest first.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{room_id}/audit-log",
    tag = "Audit Log",
    params(
        ("room_id" = String, Path, description = "Room id"),
        ("limit" = Option<usize>, Query, description = "Page size, default 50"),
        ("offset" = Option<usize>, Query, description = "Entries to skip"),
    ),
    responses(
        (status = 200, description = "Audit entries", body = AuditLogResponse),
        (status = 404, description = "Room not found", body = crate::error::ApiErrorBody),
    ),
)]
pub async fn list_audit_log(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    Query(params): Query<AuditLogParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 500);
    let offset = params.offset.unwrap_or(0);
    let data = state.service.audit_log(&room_id, limit, offset).await?;
    Ok(Json(AuditLogResponse {
        data,
        limit,
        offset,
    }))
}
