use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Immutable record of a privileged action. Append-only; consumed by the
/// external reporting layer through the audit-log read endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: String,
    pub room_id: String,
    pub actor_id: String,
    pub actor_name: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
