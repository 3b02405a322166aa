//! Role assignment and authorization decisions.
//!
//! Pure functions, no I/O. This is the only place role transitions are
//! computed; both the gateway and the HTTP surface delegate here.

use crate::models::Role;

/// Compute the role a user receives on first admission to a room.
///
/// Priority order is fixed: system administrators always get `Admin`, even
/// when they also match the room's host id; the recorded host gets `Host`;
/// everyone else starts as `Participant`. `Cohost` is never auto-assigned —
/// it is only reachable through an explicit promote.
pub fn assign_role(is_system_admin: bool, user_id: &str, host_id: &str) -> Role {
    if is_system_admin {
        Role::Admin
    } else if user_id == host_id {
        Role::Host
    } else {
        Role::Participant
    }
}

/// Whether `actor` may perform a moderator action on another participant
/// (mute, disable camera, stop screen share, kick, lower hand, pin).
pub fn can_moderate(actor: Role) -> bool {
    matches!(actor, Role::Host | Role::Cohost | Role::Admin)
}

/// Whether `actor` may manage the room itself: lock/unlock and
/// promote/demote.
pub fn can_manage_room(actor: Role) -> bool {
    matches!(actor, Role::Host | Role::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_wins_over_host_match() {
        assert_eq!(assign_role(true, "u1", "u1"), Role::Admin);
        assert_eq!(assign_role(true, "u2", "u1"), Role::Admin);
    }

    #[test]
    fn host_id_match_assigns_host() {
        assert_eq!(assign_role(false, "u1", "u1"), Role::Host);
    }

    #[test]
    fn everyone_else_is_participant() {
        assert_eq!(assign_role(false, "u2", "u1"), Role::Participant);
    }

    #[test]
    fn cohost_is_never_auto_assigned() {
        for (admin, uid) in [(false, "u1"), (false, "u2"), (true, "u1")] {
            assert_ne!(assign_role(admin, uid, "u1"), Role::Cohost);
        }
    }

    #[test]
    fn moderation_requires_elevated_role() {
        assert!(can_moderate(Role::Host));
        assert!(can_moderate(Role::Cohost));
        assert!(can_moderate(Role::Admin));
        assert!(!can_moderate(Role::Participant));
    }

    #[test]
    fn room_management_excludes_cohost() {
        assert!(can_manage_room(Role::Host));
        assert!(can_manage_room(Role::Admin));
        assert!(!can_manage_room(Role::Cohost));
        assert!(!can_manage_room(Role::Participant));
    }
}
