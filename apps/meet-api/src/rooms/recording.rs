//! Recording state-machine transitions.
//!
//! Pure functions over [`Recording`]; serialization per room is the
//! caller's job (the room lock in [`super::service`]).

use chrono::Utc;

use crate::error::RoomError;
use crate::models::{Recording, RecordingStatus};

/// Reason stamped on an orphaned recording when a new start finds it still
/// active.
pub const ORPHAN_REASON: &str = "Recording was not properly stopped";

/// Create a fresh recording, already past its `Starting` hop.
pub fn start(room_id: &str, user_id: &str) -> Recording {
    let id = meet_common::id::prefixed_ulid(meet_common::id::prefix::RECORDING);
    let started_at = Utc::now();
    Recording {
        file_name: Some(format!(
            "recording-{}-{}.webm",
            room_id,
            started_at.timestamp_millis()
        )),
        id,
        room_id: room_id.to_string(),
        started_by: user_id.to_string(),
        status: RecordingStatus::Active,
        file_url: None,
        file_size: None,
        duration_secs: None,
        started_at,
        ended_at: None,
        error_message: None,
    }
}

/// Mark a recording left `Active` by a session that never called stop.
pub fn orphan(recording: &mut Recording) {
    recording.status = RecordingStatus::Failed;
    recording.error_message = Some(ORPHAN_REASON.to_string());
    recording.ended_at = Some(Utc::now());
}

/// `Active → Stopping`, recording the elapsed duration. Any other source
/// state is rejected.
pub fn stop(recording: &mut Recording) -> Result<(), RoomError> {
    if recording.status != RecordingStatus::Active {
        return Err(RoomError::InvalidState("recording is not active"));
    }
    let ended_at = Utc::now();
    recording.status = RecordingStatus::Stopping;
    recording.ended_at = Some(ended_at);
    recording.duration_secs = Some((ended_at - recording.started_at).num_seconds());
    Ok(())
}

/// `Stopping → Completed`, once the client has uploaded the file.
pub fn complete(recording: &mut Recording, file_url: &str, file_size: u64) -> Result<(), RoomError> {
    if recording.status != RecordingStatus::Stopping {
        return Err(RoomError::InvalidState("recording is not being stopped"));
    }
    recording.status = RecordingStatus::Completed;
    recording.file_url = Some(file_url.to_string());
    recording.file_size = Some(file_size);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_produces_an_active_recording() {
        let rec = start("room_1", "u1");
        assert_eq!(rec.status, RecordingStatus::Active);
        assert!(rec.id.starts_with("rec_"));
        assert!(rec.file_name.as_deref().unwrap().starts_with("recording-room_1-"));
    }

    #[test]
    fn stop_requires_active() {
        let mut rec = start("room_1", "u1");
        stop(&mut rec).unwrap();
        assert_eq!(rec.status, RecordingStatus::Stopping);
        assert!(rec.duration_secs.is_some());

        // Second stop fails and leaves state untouched.
        assert!(matches!(stop(&mut rec), Err(RoomError::InvalidState(_))));
        assert_eq!(rec.status, RecordingStatus::Stopping);
    }

    #[test]
    fn complete_requires_stopping() {
        let mut rec = start("room_1", "u1");
        assert!(matches!(
            complete(&mut rec, "/files/x.webm", 1024),
            Err(RoomError::InvalidState(_))
        ));

        stop(&mut rec).unwrap();
        complete(&mut rec, "/files/x.webm", 1024).unwrap();
        assert_eq!(rec.status, RecordingStatus::Completed);
        assert_eq!(rec.file_size, Some(1024));
    }

    #[test]
    fn orphan_marks_failed_with_reason() {
        let mut rec = start("room_1", "u1");
        orphan(&mut rec);
        assert_eq!(rec.status, RecordingStatus::Failed);
        assert_eq!(rec.error_message.as_deref(), Some(ORPHAN_REASON));
        assert!(rec.ended_at.is_some());
    }
}
