//! Gateway opcodes, event types, and wire-format messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_JOIN: u8 = 2;
pub const OP_HEARTBEAT_ACK: u8 = 6;

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayMessage {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    pub d: Value,
}

impl GatewayMessage {
    /// Build a DISPATCH message (op=0).
    pub fn dispatch(event_name: &str, seq: u64, data: Value) -> Self {
        Self {
            op: OP_DISPATCH,
            t: Some(event_name.to_string()),
            s: Some(seq),
            d: data,
        }
    }

    /// Build a HEARTBEAT_ACK message (op=6).
    pub fn heartbeat_ack(seq: u64) -> Self {
        Self {
            op: OP_HEARTBEAT_ACK,
            t: None,
            s: None,
            d: serde_json::json!({ "ack": seq }),
        }
    }
}

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub op: u8,
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub d: Value,
}

// ---------------------------------------------------------------------------
// JOIN payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct JoinPayload {
    pub room_id: String,
    pub user_id: String,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// HEARTBEAT payload
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct HeartbeatPayload {
    #[serde(default)]
    pub seq: u64,
}

// ---------------------------------------------------------------------------
// Post-join intent payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RaiseHandPayload {
    pub raised: bool,
}

/// Intent names a client may send as dispatches after joining.
pub struct IntentName;

impl IntentName {
    pub const CHAT: &'static str = "chat";
    pub const MEDIA_UPDATE: &'static str = "media_update";
    pub const HOST_ACTION: &'static str = "host_action";
    pub const RAISE_HAND: &'static str = "raise_hand";
}

// ---------------------------------------------------------------------------
// Dispatch event types
// ---------------------------------------------------------------------------

/// Event names dispatched to clients.
pub struct EventName;

impl EventName {
    pub const JOINED: &'static str = "room:joined";
    pub const PRESENCE: &'static str = "room:presence";
    pub const CHAT: &'static str = "room:chat";
    pub const PARTICIPANT_UPDATE: &'static str = "room:participantUpdate";
    pub const HAND_RAISED: &'static str = "room:handRaised";
    pub const HAND_LOWERED: &'static str = "room:handLowered";
    pub const PIN_UPDATE: &'static str = "room:pinUpdate";
    pub const HOST_ACTION: &'static str = "room:hostAction";
    pub const HOST_ACTION_RESULT: &'static str = "room:hostActionResult";
    pub const LOCKED: &'static str = "room:locked";
    pub const UNLOCKED: &'static str = "room:unlocked";
    pub const KICKED: &'static str = "room:kicked";
}
