//! Live per-room state and the per-room locking discipline.
//!
//! Every mutation to a room's roster, hand-raise queue, pin set, or
//! recording state happens while holding that room's mutex, so the room has
//! a single logical writer at any instant. Critical sections are synchronous
//! only — network I/O (transport calls, store writes) happens before or
//! after the guarded mutation, never inside it. Rooms are independent and
//! proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::models::{Participant, Recording, Room};
use crate::rooms::hand_raise::HandRaiseQueue;
use crate::rooms::pins::{layout_mode, LayoutMode, PinSet};

/// Mutable state of one room, guarded by the registry's per-room mutex.
pub struct RoomState {
    pub room: Room,
    /// Active participants keyed by user id. `left_at` is always `None`
    /// here; departed participants are dropped from the map and survive
    /// only in the durable store.
    pub participants: HashMap<String, Participant>,
    pub hand_queue: HandRaiseQueue,
    pub pins: PinSet,
    /// The in-flight (starting/active/stopping) recording, if any.
    pub recording: Option<Recording>,
}

impl RoomState {
    pub fn new(room: Room, participants: Vec<Participant>, recording: Option<Recording>) -> Self {
        let participants = participants
            .into_iter()
            .filter(|p| p.is_active())
            .map(|p| (p.user_id.clone(), p))
            .collect();
        Self {
            room,
            participants,
            hand_queue: HandRaiseQueue::new(),
            pins: PinSet::new(),
            recording,
        }
    }

    pub fn active_count(&self) -> usize {
        self.participants.len()
    }

    pub fn screen_share_active(&self) -> bool {
        self.participants.values().any(|p| p.is_screen_sharing)
    }

    pub fn layout(&self) -> LayoutMode {
        layout_mode(self.pins.len(), self.screen_share_active())
    }

    /// Roster in join order.
    pub fn roster(&self) -> Vec<Participant> {
        let mut roster: Vec<Participant> = self.participants.values().cloned().collect();
        roster.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        roster
    }
}

/// Registry of live rooms, keyed by room id. Owned by the gateway-facing
/// service; entries are created when a room first sees traffic and removed
/// when the room is closed.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<RoomState>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Mutex<RoomState>>> {
        self.rooms.get(room_id).map(|entry| entry.value().clone())
    }

    /// Insert a freshly seeded state unless another caller won the race, in
    /// which case theirs is returned.
    pub fn insert_seeded(&self, state: RoomState) -> Arc<Mutex<RoomState>> {
        let room_id = state.room.id.clone();
        self.rooms
            .entry(room_id)
            .or_insert_with(|| Arc::new(Mutex::new(state)))
            .value()
            .clone()
    }

    pub fn remove(&self, room_id: &str) {
        self.rooms.remove(room_id);
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::Role;

    fn room(id: &str) -> Room {
        Room {
            id: id.to_string(),
            name: "test".to_string(),
            description: None,
            max_participants: 10,
            is_locked: false,
            is_active: true,
            host_id: "u_host".to_string(),
            created_at: Utc::now(),
        }
    }

    fn participant(room_id: &str, user_id: &str) -> Participant {
        Participant {
            id: format!("prt_{user_id}"),
            room_id: room_id.to_string(),
            user_id: user_id.to_string(),
            display_name: user_id.to_string(),
            role: Role::Participant,
            is_muted: false,
            is_camera_off: false,
            is_screen_sharing: false,
            is_hand_raised: false,
            joined_at: Utc::now(),
            left_at: None,
        }
    }

    #[test]
    fn seeding_drops_departed_participants() {
        let mut departed = participant("r1", "u2");
        departed.left_at = Some(Utc::now());
        let state = RoomState::new(
            room("r1"),
            vec![participant("r1", "u1"), departed],
            None,
        );
        assert_eq!(state.active_count(), 1);
        assert!(state.participants.contains_key("u1"));
    }

    #[test]
    fn insert_seeded_keeps_first_winner() {
        let registry = RoomRegistry::new();
        let first = registry.insert_seeded(RoomState::new(
            room("r1"),
            vec![participant("r1", "u1")],
            None,
        ));
        let second = registry.insert_seeded(RoomState::new(room("r1"), vec![], None));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().active_count(), 1);
    }

    #[test]
    fn layout_tracks_pins_and_screen_share() {
        let mut state = RoomState::new(
            room("r1"),
            vec![participant("r1", "u1"), participant("r1", "u2")],
            None,
        );
        assert_eq!(state.layout(), LayoutMode::Grid);

        state.pins.force_pin("u1").unwrap();
        assert_eq!(state.layout(), LayoutMode::Spotlight);

        state.pins.force_pin("u2").unwrap();
        assert_eq!(state.layout(), LayoutMode::Dual);

        // Screen share overrides the pin-derived layout.
        state.participants.get_mut("u1").unwrap().is_screen_sharing = true;
        assert_eq!(state.layout(), LayoutMode::Spotlight);
    }
}
