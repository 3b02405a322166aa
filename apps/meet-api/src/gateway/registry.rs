//! Per-room registry of live gateway connections.
//!
//! Keyed by room id and owned by the gateway — not ambient global state.
//! Its one job is connection accounting: a user may hold several sockets
//! into the same room (a rejoin racing a disconnect), and presence cleanup
//! must only run when the last one goes away.

use std::collections::{HashMap, HashSet};

use dashmap::DashMap;
use parking_lot::Mutex;

/// Connection registry for all rooms this process serves.
#[derive(Default)]
pub struct RoomConnections {
    rooms: DashMap<String, Mutex<HashMap<String, HashSet<String>>>>,
}

impl RoomConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session for (room, user).
    pub fn register(&self, room_id: &str, user_id: &str, session_id: &str) {
        let entry = self
            .rooms
            .entry(room_id.to_string())
            .or_insert_with(|| Mutex::new(HashMap::new()));
        entry
            .lock()
            .entry(user_id.to_string())
            .or_default()
            .insert(session_id.to_string());
    }

    /// Drop a session. Returns `true` when this was the user's last
    /// connection into the room, i.e. presence cleanup should run.
    pub fn unregister(&self, room_id: &str, user_id: &str, session_id: &str) -> bool {
        let Some(entry) = self.rooms.get(room_id) else {
            return false;
        };
        let mut users = entry.lock();
        let Some(sessions) = users.get_mut(user_id) else {
            return false;
        };
        sessions.remove(session_id);
        if sessions.is_empty() {
            users.remove(user_id);
            let now_empty = users.is_empty();
            drop(users);
            drop(entry);
            if now_empty {
                // Last connection of the room: drop the room entry too, but
                // only if nobody re-registered in the meantime.
                self.rooms
                    .remove_if(room_id, |_, users| users.lock().is_empty());
            }
            true
        } else {
            false
        }
    }

    /// Users with at least one live connection into the room.
    pub fn connected_users(&self, room_id: &str) -> Vec<String> {
        match self.rooms.get(room_id) {
            Some(entry) => entry.lock().keys().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn connection_count(&self, room_id: &str) -> usize {
        match self.rooms.get(room_id) {
            Some(entry) => entry.lock().values().map(HashSet::len).sum(),
            None => 0,
        }
    }
}
