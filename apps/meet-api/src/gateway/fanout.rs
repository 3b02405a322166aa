//! Broadcast hub for dispatching gateway events to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connected session
//! subscribes and filters events locally by room id (and target, for
//! messages addressed to one user). This is efficient for a single-process
//! deployment.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A payload broadcast to connected gateway sessions.
#[derive(Debug, Clone)]
pub struct BroadcastPayload {
    /// The room this event belongs to.
    pub room_id: String,
    /// The dispatch event name (e.g. "room:presence").
    pub event_name: String,
    /// When set, only the session(s) of this user receive the event.
    pub target_user_id: Option<String>,
    /// Serialized event data.
    pub data: Value,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct GatewayBroadcast {
    sender: broadcast::Sender<Arc<BroadcastPayload>>,
}

impl GatewayBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the broadcast channel. Each gateway session should call
    /// this once to get its own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<BroadcastPayload>> {
        self.sender.subscribe()
    }

    /// Dispatch an event to every session in a room.
    pub fn dispatch_room(&self, room_id: &str, event_name: &str, data: Value) {
        self.dispatch(BroadcastPayload {
            room_id: room_id.to_string(),
            event_name: event_name.to_string(),
            target_user_id: None,
            data,
        });
    }

    /// Dispatch an event to one user's session(s) in a room.
    pub fn dispatch_user(&self, room_id: &str, user_id: &str, event_name: &str, data: Value) {
        self.dispatch(BroadcastPayload {
            room_id: room_id.to_string(),
            event_name: event_name.to_string(),
            target_user_id: Some(user_id.to_string()),
            data,
        });
    }

    fn dispatch(&self, payload: BroadcastPayload) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(payload));
    }
}

impl Default for GatewayBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
