//! Incoming intent dispatch: JOIN and the post-join client intents.

use chrono::Utc;
use serde_json::Value;

use crate::models::{ChatMessage, MediaPatch};
use crate::rooms::HostAction;
use crate::AppState;

use super::events::{
    ChatPayload, EventName, GatewayMessage, IntentName, JoinPayload, RaiseHandPayload,
};
use super::session::GatewaySession;

/// Heartbeat interval sent to clients in the JOINED payload (ms).
pub const HEARTBEAT_INTERVAL_MS: u64 = 41250;

/// Process the JOIN handshake. Returns the session and the JOINED dispatch
/// on success, a close reason otherwise.
pub async fn handle_join(
    state: &AppState,
    payload: JoinPayload,
) -> Result<(GatewaySession, GatewayMessage), &'static str> {
    let outcome = state
        .service
        .join(&payload.room_id, &payload.user_id, &payload.display_name)
        .await
        .map_err(|e| {
            tracing::debug!(room_id = %payload.room_id, user_id = %payload.user_id, error = %e, "join refused");
            e.code()
        })?;

    let session = GatewaySession::new(
        payload.room_id,
        payload.user_id,
        outcome.participant.display_name.clone(),
    );

    let joined_data = serde_json::json!({
        "session_id": session.session_id,
        "room": outcome.room,
        "participant": outcome.participant,
        "participants": outcome.participants,
        "transport_token": outcome.transport_token,
        "transport_url": outcome.transport_url,
        "heartbeat_interval": HEARTBEAT_INTERVAL_MS,
    });

    let seq = session.next_seq();
    let joined_msg = GatewayMessage::dispatch(EventName::JOINED, seq, joined_data);
    Ok((session, joined_msg))
}

/// Handle a post-join dispatch from the client. Returns the messages to
/// send back on this connection only (acks); room-wide effects go through
/// the fanout hub.
pub async fn handle_dispatch(
    state: &AppState,
    session: &GatewaySession,
    intent: &str,
    data: Value,
) -> Vec<GatewayMessage> {
    match intent {
        IntentName::CHAT => {
            let Ok(payload) = serde_json::from_value::<ChatPayload>(data) else {
                tracing::debug!(session_id = %session.session_id, "malformed chat payload");
                return Vec::new();
            };
            let message = ChatMessage {
                id: state.snowflake.generate().to_string(),
                room_id: session.room_id.clone(),
                user_id: session.user_id.clone(),
                user_name: session.display_name.clone(),
                message: payload.message,
                timestamp: Utc::now(),
            };
            match serde_json::to_value(&message) {
                Ok(data) => state
                    .broadcast
                    .dispatch_room(&session.room_id, EventName::CHAT, data),
                Err(e) => tracing::error!(?e, "failed to serialize chat message"),
            }
            Vec::new()
        }

        IntentName::MEDIA_UPDATE => {
            let Ok(patch) = serde_json::from_value::<MediaPatch>(data) else {
                tracing::debug!(session_id = %session.session_id, "malformed media update payload");
                return Vec::new();
            };
            if let Err(e) = state
                .service
                .update_media(&session.room_id, &session.user_id, patch)
                .await
            {
                tracing::debug!(
                    session_id = %session.session_id,
                    error = %e,
                    "media update rejected"
                );
            }
            Vec::new()
        }

        IntentName::RAISE_HAND => {
            let Ok(payload) = serde_json::from_value::<RaiseHandPayload>(data) else {
                tracing::debug!(session_id = %session.session_id, "malformed raise-hand payload");
                return Vec::new();
            };
            if let Err(e) = state
                .service
                .set_hand_raised(&session.room_id, &session.user_id, payload.raised)
                .await
            {
                tracing::debug!(
                    session_id = %session.session_id,
                    error = %e,
                    "raise hand rejected"
                );
            }
            Vec::new()
        }

        IntentName::HOST_ACTION => {
            let action = match serde_json::from_value::<HostAction>(data) {
                Ok(action) => action,
                Err(_) => {
                    return vec![host_action_result(
                        session,
                        Some(("BAD_REQUEST", "Malformed host action")),
                    )]
                }
            };
            let result = state
                .service
                .host_action(&session.room_id, &session.user_id, action)
                .await;
            match result {
                Ok(()) => vec![host_action_result(session, None)],
                Err(e) => vec![host_action_result(session, Some((e.code(), &e.to_string())))],
            }
        }

        other => {
            tracing::debug!(session_id = %session.session_id, intent = other, "unknown intent");
            Vec::new()
        }
    }
}

fn host_action_result(
    session: &GatewaySession,
    error: Option<(&str, &str)>,
) -> GatewayMessage {
    let data = match error {
        None => serde_json::json!({ "success": true }),
        Some((code, message)) => serde_json::json!({
            "success": false,
            "error": { "code": code, "message": message },
        }),
    };
    GatewayMessage::dispatch(EventName::HOST_ACTION_RESULT, session.next_seq(), data)
}
