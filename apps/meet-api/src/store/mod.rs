//! Durable storage seam.
//!
//! The relational CRUD layer is an external collaborator; this trait is the
//! interface the coordinator consumes. Backed by an in-memory map here and
//! by a SQL store in a full deployment.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::RoomError;
use crate::models::{AuditLogEntry, Participant, Recording, RecordingStatus, Room};

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(&self, room: Room) -> Result<(), RoomError>;
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, RoomError>;
    async fn update_room(&self, room: &Room) -> Result<(), RoomError>;
    async fn list_active_rooms(&self) -> Result<Vec<Room>, RoomError>;

    async fn insert_participant(&self, participant: Participant) -> Result<(), RoomError>;
    async fn update_participant(&self, participant: &Participant) -> Result<(), RoomError>;
    async fn find_active_participant(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Participant>, RoomError>;
    async fn list_active_participants(&self, room_id: &str) -> Result<Vec<Participant>, RoomError>;
    async fn count_active_participants(&self, room_id: &str) -> Result<usize, RoomError>;

    async fn append_audit(&self, entry: AuditLogEntry) -> Result<(), RoomError>;
    /// Newest-first page of a room's audit trail.
    async fn list_audit(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>, RoomError>;

    async fn insert_recording(&self, recording: Recording) -> Result<(), RoomError>;
    async fn get_recording(&self, recording_id: &str) -> Result<Option<Recording>, RoomError>;
    async fn update_recording(&self, recording: &Recording) -> Result<(), RoomError>;
    async fn find_active_recording(&self, room_id: &str) -> Result<Option<Recording>, RoomError>;
    /// Newest-first recordings for a room.
    async fn list_recordings(&self, room_id: &str) -> Result<Vec<Recording>, RoomError>;
    /// Newest-first page across all rooms, plus the total count.
    async fn list_all_recordings(
        &self,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Recording>, usize), RoomError>;
    async fn delete_recording(&self, recording_id: &str) -> Result<bool, RoomError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tables {
    rooms: HashMap<String, Room>,
    participants: Vec<Participant>,
    audit: Vec<AuditLogEntry>,
    recordings: Vec<Recording>,
}

/// In-memory [`RoomStore`] used in tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, room: Room) -> Result<(), RoomError> {
        self.tables.lock().unwrap().rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, RoomError> {
        Ok(self.tables.lock().unwrap().rooms.get(room_id).cloned())
    }

    async fn update_room(&self, room: &Room) -> Result<(), RoomError> {
        self.tables
            .lock()
            .unwrap()
            .rooms
            .insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn list_active_rooms(&self) -> Result<Vec<Room>, RoomError> {
        let tables = self.tables.lock().unwrap();
        let mut rooms: Vec<Room> = tables
            .rooms
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rooms)
    }

    async fn insert_participant(&self, participant: Participant) -> Result<(), RoomError> {
        self.tables.lock().unwrap().participants.push(participant);
        Ok(())
    }

    async fn update_participant(&self, participant: &Participant) -> Result<(), RoomError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables
            .participants
            .iter_mut()
            .find(|p| p.id == participant.id)
        {
            *existing = participant.clone();
        }
        Ok(())
    }

    async fn find_active_participant(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Option<Participant>, RoomError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .participants
            .iter()
            .find(|p| p.room_id == room_id && p.user_id == user_id && p.is_active())
            .cloned())
    }

    async fn list_active_participants(&self, room_id: &str) -> Result<Vec<Participant>, RoomError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.room_id == room_id && p.is_active())
            .cloned()
            .collect())
    }

    async fn count_active_participants(&self, room_id: &str) -> Result<usize, RoomError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.room_id == room_id && p.is_active())
            .count())
    }

    async fn append_audit(&self, entry: AuditLogEntry) -> Result<(), RoomError> {
        self.tables.lock().unwrap().audit.push(entry);
        Ok(())
    }

    async fn list_audit(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>, RoomError> {
        let tables = self.tables.lock().unwrap();
        let mut entries: Vec<AuditLogEntry> = tables
            .audit
            .iter()
            .filter(|e| e.room_id == room_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries.into_iter().skip(offset).take(limit).collect())
    }

    async fn insert_recording(&self, recording: Recording) -> Result<(), RoomError> {
        self.tables.lock().unwrap().recordings.push(recording);
        Ok(())
    }

    async fn get_recording(&self, recording_id: &str) -> Result<Option<Recording>, RoomError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .recordings
            .iter()
            .find(|r| r.id == recording_id)
            .cloned())
    }

    async fn update_recording(&self, recording: &Recording) -> Result<(), RoomError> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.recordings.iter_mut().find(|r| r.id == recording.id) {
            *existing = recording.clone();
        }
        Ok(())
    }

    async fn find_active_recording(&self, room_id: &str) -> Result<Option<Recording>, RoomError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .recordings
            .iter()
            .find(|r| r.room_id == room_id && r.status == RecordingStatus::Active)
            .cloned())
    }

    async fn list_recordings(&self, room_id: &str) -> Result<Vec<Recording>, RoomError> {
        let tables = self.tables.lock().unwrap();
        let mut recordings: Vec<Recording> = tables
            .recordings
            .iter()
            .filter(|r| r.room_id == room_id)
            .cloned()
            .collect();
        recordings.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(recordings)
    }

    async fn list_all_recordings(
        &self,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Recording>, usize), RoomError> {
        let tables = self.tables.lock().unwrap();
        let mut recordings: Vec<Recording> = tables.recordings.clone();
        recordings.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        let total = recordings.len();
        let page = page.max(1);
        let start = (page - 1) * limit;
        Ok((
            recordings.into_iter().skip(start).take(limit).collect(),
            total,
        ))
    }

    async fn delete_recording(&self, recording_id: &str) -> Result<bool, RoomError> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.recordings.len();
        tables.recordings.retain(|r| r.id != recording_id);
        Ok(tables.recordings.len() != before)
    }
}
