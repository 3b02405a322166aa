use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Domain error for room coordination. Every variant is recoverable at the
/// caller: a failure is terminal for the single request only and leaves the
/// room state untouched.
#[derive(Debug, Error)]
pub enum RoomError {
    #[error("room is locked")]
    RoomLocked,
    #[error("room is full")]
    RoomFull,
    #[error("room not found")]
    RoomNotFound,
    #[error("participant not found")]
    ParticipantNotFound,
    #[error("target is no longer in the room")]
    TargetNotFound,
    #[error("insufficient permissions")]
    InsufficientPermission,
    #[error("at most two participants can be pinned")]
    PinLimitExceeded,
    #[error("invalid recording state: {0}")]
    InvalidState(&'static str),
    #[error("action had no effect")]
    AlreadyActive,
    #[error("recording not found")]
    RecordingNotFound,
    #[error("media transport error: {0}")]
    Transport(String),
}

impl RoomError {
    /// Stable machine-readable code, shared by the HTTP and gateway surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RoomLocked => "ROOM_LOCKED",
            Self::RoomFull => "ROOM_FULL",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            Self::TargetNotFound => "TARGET_NOT_FOUND",
            Self::InsufficientPermission => "INSUFFICIENT_PERMISSION",
            Self::PinLimitExceeded => "PIN_LIMIT_EXCEEDED",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::AlreadyActive => "ALREADY_ACTIVE",
            Self::RecordingNotFound => "RECORDING_NOT_FOUND",
            Self::Transport(_) => "TRANSPORT_ERROR",
        }
    }
}

/// Structured API error returned to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// Application-level error type that converts into an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        let status = match &err {
            RoomError::RoomLocked
            | RoomError::RoomFull
            | RoomError::InvalidState(_)
            | RoomError::PinLimitExceeded => StatusCode::BAD_REQUEST,
            RoomError::RoomNotFound
            | RoomError::ParticipantNotFound
            | RoomError::TargetNotFound
            | RoomError::RecordingNotFound => StatusCode::NOT_FOUND,
            RoomError::InsufficientPermission => StatusCode::FORBIDDEN,
            RoomError::AlreadyActive => StatusCode::CONFLICT,
            RoomError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        if let RoomError::Transport(detail) = &err {
            tracing::error!(%detail, "media transport error");
        }
        Self {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}
