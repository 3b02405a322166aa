mod common;

use common::{build_state, create_room};
use meet_api::error::RoomError;
use meet_api::models::Role;
use meet_api::rooms::HostAction;
use meet_api::store::RoomStore;

#[tokio::test]
async fn capacity_is_enforced_and_freed_by_leave() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "host", 2).await;

    ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();
    ctx.state.service.join(&room.id, "b", "Bob").await.unwrap();

    let err = ctx
        .state
        .service
        .join(&room.id, "c", "Carol")
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomFull));

    assert!(ctx.state.service.leave(&room.id, "a").await.unwrap());
    ctx.state.service.join(&room.id, "c", "Carol").await.unwrap();

    let roster = ctx.state.service.roster(&room.id).await.unwrap();
    let mut users: Vec<&str> = roster.iter().map(|p| p.user_id.as_str()).collect();
    users.sort();
    assert_eq!(users, ["b", "c"]);
}

#[tokio::test]
async fn at_most_one_active_participant_per_user() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "host", 5).await;

    let first = ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();
    let second = ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();

    // Idempotent rejoin reuses the membership: same record, same role.
    assert_eq!(first.participant.id, second.participant.id);
    assert_eq!(first.participant.role, second.participant.role);
    assert_eq!(ctx.state.service.roster(&room.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn role_assignment_is_priority_ordered() {
    let ctx = build_state(&["root"]);
    // The admin account is also the room host: admin still wins.
    let room = create_room(&ctx, "root", 5).await;

    let admin = ctx.state.service.join(&room.id, "root", "Root").await.unwrap();
    assert_eq!(admin.participant.role, Role::Admin);

    let other_room = create_room(&ctx, "host", 5).await;
    let host = ctx
        .state
        .service
        .join(&other_room.id, "host", "Hannah")
        .await
        .unwrap();
    assert_eq!(host.participant.role, Role::Host);

    let guest = ctx
        .state
        .service
        .join(&other_room.id, "guest", "Gus")
        .await
        .unwrap();
    assert_eq!(guest.participant.role, Role::Participant);
}

#[tokio::test]
async fn rejoin_after_leave_creates_a_new_membership() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "host", 5).await;

    let first = ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();
    ctx.state.service.leave(&room.id, "a").await.unwrap();
    let second = ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();

    assert_ne!(first.participant.id, second.participant.id);
    assert_eq!(ctx.state.service.roster(&room.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn locked_room_refuses_new_joins() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "host", 5).await;
    ctx.state.service.join(&room.id, "host", "Hannah").await.unwrap();

    ctx.state
        .service
        .host_action(&room.id, "host", HostAction::LockRoom)
        .await
        .unwrap();

    let err = ctx
        .state
        .service
        .join(&room.id, "late", "Larry")
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::RoomLocked));

    ctx.state
        .service
        .host_action(&room.id, "host", HostAction::UnlockRoom)
        .await
        .unwrap();
    ctx.state.service.join(&room.id, "late", "Larry").await.unwrap();
}

#[tokio::test]
async fn participant_actor_is_denied_without_audit_or_state_change() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "host", 5).await;
    ctx.state.service.join(&room.id, "host", "Hannah").await.unwrap();
    ctx.state.service.join(&room.id, "p", "Pat").await.unwrap();
    ctx.state.service.join(&room.id, "q", "Quinn").await.unwrap();

    let err = ctx
        .state
        .service
        .host_action(
            &room.id,
            "p",
            HostAction::MuteUser {
                target_user_id: "q".to_string(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::InsufficientPermission));

    let roster = ctx.state.service.roster(&room.id).await.unwrap();
    let q = roster.iter().find(|p| p.user_id == "q").unwrap();
    assert!(!q.is_muted);

    let audit = ctx.store.list_audit(&room.id, 100, 0).await.unwrap();
    assert!(audit.iter().all(|e| e.action != "MUTE_USER"));
}

#[tokio::test]
async fn promoted_cohost_can_moderate_until_demoted() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    ctx.state.service.join(&room.id, "h", "Hannah").await.unwrap();
    ctx.state.service.join(&room.id, "p", "Pat").await.unwrap();
    ctx.state.service.join(&room.id, "q", "Quinn").await.unwrap();

    ctx.state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::PromoteUser {
                target_user_id: "p".to_string(),
            },
        )
        .await
        .unwrap();

    // Freshly promoted cohost can mute.
    ctx.state
        .service
        .host_action(
            &room.id,
            "p",
            HostAction::MuteUser {
                target_user_id: "q".to_string(),
                reason: None,
            },
        )
        .await
        .unwrap();
    let roster = ctx.state.service.roster(&room.id).await.unwrap();
    assert!(roster.iter().find(|p| p.user_id == "q").unwrap().is_muted);

    ctx.state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::DemoteUser {
                target_user_id: "p".to_string(),
            },
        )
        .await
        .unwrap();

    // Checks are re-evaluated per action: the demoted user is denied now.
    let err = ctx
        .state
        .service
        .host_action(
            &room.id,
            "p",
            HostAction::DisableCamera {
                target_user_id: "q".to_string(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::InsufficientPermission));
}

#[tokio::test]
async fn kick_cleans_roster_queue_pins_and_transport() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    ctx.state.service.join(&room.id, "h", "Hannah").await.unwrap();
    ctx.state.service.join(&room.id, "p", "Pat").await.unwrap();

    ctx.state
        .service
        .set_hand_raised(&room.id, "p", true)
        .await
        .unwrap();
    ctx.state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::PinUser {
                target_user_id: "p".to_string(),
            },
        )
        .await
        .unwrap();

    ctx.state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::KickUser {
                target_user_id: "p".to_string(),
                reason: Some("disruptive".to_string()),
            },
        )
        .await
        .unwrap();

    let roster = ctx.state.service.roster(&room.id).await.unwrap();
    assert!(roster.iter().all(|p| p.user_id != "p"));

    // No dangling queue entry: the hand queue only contains h after h raises.
    let queue = ctx
        .state
        .service
        .set_hand_raised(&room.id, "h", true)
        .await
        .unwrap();
    assert_eq!(queue, ["h"]);

    // The SFU was told to drop the participant.
    assert!(ctx
        .transport
        .calls()
        .contains(&format!("remove:{}:p", room.id)));

    let audit = ctx.store.list_audit(&room.id, 100, 0).await.unwrap();
    assert!(audit.iter().any(|e| e.action == "KICK_USER"));
}

#[tokio::test]
async fn disconnect_cleanup_is_idempotent_with_explicit_leave() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();
    ctx.state
        .service
        .set_hand_raised(&room.id, "a", true)
        .await
        .unwrap();

    // Explicit leave, then the disconnect path fires for the same session.
    assert!(ctx.state.service.leave(&room.id, "a").await.unwrap());
    assert!(!ctx.state.service.leave(&room.id, "a").await.unwrap());

    assert!(ctx.state.service.roster(&room.id).await.unwrap().is_empty());
    // Only one LEAVE_ROOM entry: the no-op produced none.
    let audit = ctx.store.list_audit(&room.id, 100, 0).await.unwrap();
    assert_eq!(
        audit.iter().filter(|e| e.action == "LEAVE_ROOM").count(),
        1
    );
}

#[tokio::test]
async fn hand_raise_order_is_fifo() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    ctx.state.service.join(&room.id, "a", "Alice").await.unwrap();
    ctx.state.service.join(&room.id, "b", "Bob").await.unwrap();

    ctx.state.service.set_hand_raised(&room.id, "a", true).await.unwrap();
    ctx.state.service.set_hand_raised(&room.id, "b", true).await.unwrap();
    // Duplicate raise is a no-op.
    let queue = ctx
        .state
        .service
        .set_hand_raised(&room.id, "a", true)
        .await
        .unwrap();
    assert_eq!(queue, ["a", "b"]);

    let queue = ctx
        .state
        .service
        .set_hand_raised(&room.id, "a", false)
        .await
        .unwrap();
    assert_eq!(queue, ["b"]);
}

#[tokio::test]
async fn third_pin_is_rejected_via_host_action() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    for (user, name) in [("h", "Hannah"), ("a", "Alice"), ("b", "Bob"), ("c", "Carol")] {
        ctx.state.service.join(&room.id, user, name).await.unwrap();
    }

    for target in ["a", "b"] {
        ctx.state
            .service
            .host_action(
                &room.id,
                "h",
                HostAction::PinUser {
                    target_user_id: target.to_string(),
                },
            )
            .await
            .unwrap();
    }

    let err = ctx
        .state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::PinUser {
                target_user_id: "c".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::PinLimitExceeded));
}

#[tokio::test]
async fn action_on_departed_target_fails_softly() {
    let ctx = build_state(&[]);
    let room = create_room(&ctx, "h", 5).await;
    ctx.state.service.join(&room.id, "h", "Hannah").await.unwrap();
    ctx.state.service.join(&room.id, "p", "Pat").await.unwrap();
    ctx.state.service.leave(&room.id, "p").await.unwrap();

    let err = ctx
        .state
        .service
        .host_action(
            &room.id,
            "h",
            HostAction::MuteUser {
                target_user_id: "p".to_string(),
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RoomError::TargetNotFound));

    // A no-op writes no audit entry.
    let audit = ctx.store.list_audit(&room.id, 100, 0).await.unwrap();
    assert!(audit.iter().all(|e| e.action != "MUTE_USER"));
}
