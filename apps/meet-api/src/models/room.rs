use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A meeting room. `host_id` is the user that created the room and is the
/// anchor for host-role assignment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub max_participants: u32,
    pub is_locked: bool,
    pub is_active: bool,
    pub host_id: String,
    pub created_at: DateTime<Utc>,
}

/// Room plus its live participant count, as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummary {
    pub room: Room,
    pub participant_count: usize,
}
