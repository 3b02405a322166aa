//! Wire format of the peer broadcast channel.

use serde::{Deserialize, Serialize};

use crate::error::RoomError;

/// A JSON message relayed among room participants via the data channel.
///
/// The set is closed; unknown types fail decoding and are dropped by
/// receivers. Targeted variants carry a `targetId` every receiver compares
/// against its own identity. Senders of `admin-*` types must independently
/// hold a privileged role — the channel itself performs no enforcement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum PeerMessage {
    HandRaise {
        participant_id: String,
        raised: bool,
    },
    AdminMute {
        target_id: String,
    },
    AdminDisableCamera {
        target_id: String,
    },
    AdminStopScreenshare {
        target_id: String,
    },
    AdminKick {
        target_id: String,
    },
    AdminLowerHand {
        target_id: String,
    },
    /// Broadcast, no target: standing microphone policy for the room.
    AdminLockMics {
        locked: bool,
    },
    /// Broadcast, no target: everyone applies the shared pin set.
    AdminForcePin {
        target_id: String,
    },
    AdminForceUnpin {
        target_id: String,
    },
}

impl PeerMessage {
    pub fn to_bytes(&self) -> Result<Vec<u8>, RoomError> {
        serde_json::to_vec(self).map_err(|e| RoomError::Transport(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RoomError> {
        serde_json::from_slice(bytes).map_err(|e| RoomError::Transport(e.to_string()))
    }
}
