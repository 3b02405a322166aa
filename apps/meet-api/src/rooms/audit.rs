//! Audit entry construction and action tags.

use chrono::Utc;

use crate::models::AuditLogEntry;

/// Action tags recorded in the audit trail.
pub struct AuditAction;

impl AuditAction {
    pub const JOIN_ROOM: &'static str = "JOIN_ROOM";
    pub const LEAVE_ROOM: &'static str = "LEAVE_ROOM";
    pub const MUTE_USER: &'static str = "MUTE_USER";
    pub const DISABLE_CAMERA: &'static str = "DISABLE_CAMERA";
    pub const STOP_SCREENSHARE: &'static str = "STOP_SCREENSHARE";
    pub const KICK_USER: &'static str = "KICK_USER";
    pub const LOWER_HAND: &'static str = "LOWER_HAND";
    pub const PIN_USER: &'static str = "PIN_USER";
    pub const UNPIN_USER: &'static str = "UNPIN_USER";
    pub const LOCK_ROOM: &'static str = "LOCK_ROOM";
    pub const UNLOCK_ROOM: &'static str = "UNLOCK_ROOM";
    pub const PROMOTE_COHOST: &'static str = "PROMOTE_COHOST";
    pub const DEMOTE_USER: &'static str = "DEMOTE_USER";
}

/// Build an audit entry with a fresh id and server timestamp.
pub fn entry(
    room_id: &str,
    actor_id: &str,
    actor_name: &str,
    action: &str,
    target_id: Option<&str>,
    target_name: Option<&str>,
    details: impl Into<String>,
) -> AuditLogEntry {
    AuditLogEntry {
        id: meet_common::id::prefixed_ulid(meet_common::id::prefix::AUDIT),
        room_id: room_id.to_string(),
        actor_id: actor_id.to_string(),
        actor_name: actor_name.to_string(),
        action: action.to_string(),
        target_id: target_id.map(str::to_string),
        target_name: target_name.map(str::to_string),
        details: Some(details.into()),
        created_at: Utc::now(),
    }
}
