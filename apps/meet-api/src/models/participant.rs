use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

/// One membership of a user in a room, distinct from identity. Soft-deleted
/// by setting `left_at`; at most one record per (room, user) has
/// `left_at = None` at any time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Participant {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    pub is_muted: bool,
    pub is_camera_off: bool,
    pub is_screen_sharing: bool,
    pub is_hand_raised: bool,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}

/// Partial update of a participant's device flags. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct MediaPatch {
    pub is_muted: Option<bool>,
    pub is_camera_off: Option<bool>,
    pub is_screen_sharing: Option<bool>,
    pub is_hand_raised: Option<bool>,
}

impl MediaPatch {
    pub fn apply(&self, participant: &mut Participant) {
        if let Some(v) = self.is_muted {
            participant.is_muted = v;
        }
        if let Some(v) = self.is_camera_off {
            participant.is_camera_off = v;
        }
        if let Some(v) = self.is_screen_sharing {
            participant.is_screen_sharing = v;
        }
        if let Some(v) = self.is_hand_raised {
            participant.is_hand_raised = v;
        }
    }
}
