use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role a participant holds inside a room.
///
/// This is the single shared notion of privilege for the whole system; the
/// wire format (`"ADMIN"`, `"HOST"`, ...) only exists at the serde boundary.
/// Role transitions are computed exclusively by [`crate::rooms::policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Host,
    Cohost,
    Participant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Host => "HOST",
            Self::Cohost => "COHOST",
            Self::Participant => "PARTICIPANT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
