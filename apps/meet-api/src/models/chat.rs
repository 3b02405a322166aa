use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A chat message relayed through the gateway. Not persisted; the snowflake
/// id gives receivers a stable ordering key.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatMessage {
    pub id: String,
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}
