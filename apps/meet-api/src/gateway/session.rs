//! Per-connection gateway session state.

use std::sync::atomic::{AtomicU64, Ordering};

use super::fanout::BroadcastPayload;

/// State for a single WebSocket connection, created once the JOIN handshake
/// succeeds.
#[derive(Debug)]
pub struct GatewaySession {
    /// Unique session identifier (`ses_` prefixed ULID).
    pub session_id: String,
    /// The room this connection joined.
    pub room_id: String,
    /// Authenticated user ID.
    pub user_id: String,
    /// Display name captured at join time.
    pub display_name: String,
    /// Monotonically increasing sequence number for dispatch events.
    seq: AtomicU64,
}

impl GatewaySession {
    pub fn new(room_id: String, user_id: String, display_name: String) -> Self {
        Self {
            session_id: meet_common::id::prefixed_ulid(meet_common::id::prefix::SESSION),
            room_id,
            user_id,
            display_name,
            seq: AtomicU64::new(0),
        }
    }

    /// Get the next sequence number for a dispatch event.
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Whether this session should receive a broadcast payload: same room,
    /// and either untargeted or addressed to this user.
    pub fn wants(&self, payload: &BroadcastPayload) -> bool {
        if payload.room_id != self.room_id {
            return false;
        }
        match &payload.target_user_id {
            Some(target) => target == &self.user_id,
            None => true,
        }
    }
}
