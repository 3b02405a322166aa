mod common;

use common::{build_state, create_room};
use meet_api::gateway::events::{EventName, IntentName, JoinPayload, OP_DISPATCH};
use meet_api::gateway::handler::{handle_dispatch, handle_join};
use serde_json::json;

#[tokio::test]
async fn join_handshake_returns_roster_and_credential() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;

    let (session, joined) = handle_join(
        &ctx.state,
        JoinPayload {
            room_id: room.id.clone(),
            user_id: "h".to_string(),
            display_name: "Hannah".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(session.room_id, room.id);
    assert!(session.session_id.starts_with("ses_"));

    assert_eq!(joined.op, OP_DISPATCH);
    assert_eq!(joined.t.as_deref(), Some(EventName::JOINED));
    assert_eq!(joined.d["participant"]["role"], "HOST");
    assert_eq!(joined.d["participants"].as_array().unwrap().len(), 1);
    assert!(!joined.d["transport_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn join_into_missing_room_is_refused_with_the_error_code() {
    let ctx = build_state(&[]);
    let err = handle_join(
        &ctx.state,
        JoinPayload {
            room_id: "room_missing".to_string(),
            user_id: "u".to_string(),
            display_name: "U".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err, "ROOM_NOT_FOUND");
}

#[tokio::test]
async fn chat_is_broadcast_to_the_room() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;

    let mut rx = ctx.state.broadcast.subscribe();
    let (session, _) = handle_join(
        &ctx.state,
        JoinPayload {
            room_id: room.id.clone(),
            user_id: "h".to_string(),
            display_name: "Hannah".to_string(),
        },
    )
    .await
    .unwrap();

    let replies = handle_dispatch(
        &ctx.state,
        &session,
        IntentName::CHAT,
        json!({ "message": "hello" }),
    )
    .await;
    assert!(replies.is_empty());

    // First the presence-join from the handshake, then the chat message.
    let presence = rx.try_recv().unwrap();
    assert_eq!(presence.event_name, EventName::PRESENCE);

    let chat = rx.try_recv().unwrap();
    assert_eq!(chat.event_name, EventName::CHAT);
    assert_eq!(chat.data["message"], "hello");
    assert_eq!(chat.data["user_name"], "Hannah");
    assert!(chat.data["id"].as_str().unwrap().parse::<i64>().unwrap() > 0);
}

#[tokio::test]
async fn host_action_from_participant_gets_a_failure_ack() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;

    for (user, name) in [("h", "Hannah"), ("p", "Pat"), ("q", "Quinn")] {
        handle_join(
            &ctx.state,
            JoinPayload {
                room_id: room.id.clone(),
                user_id: user.to_string(),
                display_name: name.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let (session, _) = handle_join(
        &ctx.state,
        JoinPayload {
            room_id: room.id.clone(),
            user_id: "p".to_string(),
            display_name: "Pat".to_string(),
        },
    )
    .await
    .unwrap();

    let replies = handle_dispatch(
        &ctx.state,
        &session,
        IntentName::HOST_ACTION,
        json!({ "type": "KICK_USER", "target_user_id": "q" }),
    )
    .await;

    assert_eq!(replies.len(), 1);
    let ack = &replies[0];
    assert_eq!(ack.t.as_deref(), Some(EventName::HOST_ACTION_RESULT));
    assert_eq!(ack.d["success"], false);
    assert_eq!(ack.d["error"]["code"], "INSUFFICIENT_PERMISSION");
}

#[tokio::test]
async fn host_action_from_host_succeeds_and_acks() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;

    let (host_session, _) = handle_join(
        &ctx.state,
        JoinPayload {
            room_id: room.id.clone(),
            user_id: "h".to_string(),
            display_name: "Hannah".to_string(),
        },
    )
    .await
    .unwrap();
    handle_join(
        &ctx.state,
        JoinPayload {
            room_id: room.id.clone(),
            user_id: "p".to_string(),
            display_name: "Pat".to_string(),
        },
    )
    .await
    .unwrap();

    let mut rx = ctx.state.broadcast.subscribe();
    let replies = handle_dispatch(
        &ctx.state,
        &host_session,
        IntentName::HOST_ACTION,
        json!({ "type": "MUTE_USER", "target_user_id": "p" }),
    )
    .await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].d["success"], true);

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event_name, EventName::HOST_ACTION);
    assert_eq!(event.data["type"], "FORCE_MUTE");
    assert_eq!(event.data["target_user_id"], "p");
}
