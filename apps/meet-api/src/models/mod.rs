pub mod audit_log;
pub mod chat;
pub mod participant;
pub mod recording;
pub mod role;
pub mod room;

pub use audit_log::AuditLogEntry;
pub use chat::ChatMessage;
pub use participant::{MediaPatch, Participant};
pub use recording::{Recording, RecordingStatus};
pub use role::Role;
pub use room::{Room, RoomSummary};
