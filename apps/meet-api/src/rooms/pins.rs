//! Globally synchronized pin set and the layout derived from it.

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::RoomError;

/// Hard cap on simultaneous pins. A third pin is rejected, never silently
/// evicting an existing one.
pub const MAX_PINS: usize = 2;

/// The set of spotlighted participants, shared by every viewer in the room.
/// Per-viewer "local" pins are client state and never reach the server.
#[derive(Debug, Default, Clone)]
pub struct PinSet {
    pinned: Vec<String>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a participant to the pin set.
    ///
    /// Errors: [`RoomError::AlreadyActive`] if already pinned,
    /// [`RoomError::PinLimitExceeded`] if the set is full — the existing set
    /// is left unchanged in both cases.
    pub fn force_pin(&mut self, user_id: &str) -> Result<(), RoomError> {
        if self.pinned.iter().any(|id| id == user_id) {
            return Err(RoomError::AlreadyActive);
        }
        if self.pinned.len() >= MAX_PINS {
            return Err(RoomError::PinLimitExceeded);
        }
        self.pinned.push(user_id.to_string());
        Ok(())
    }

    /// Remove a participant from the pin set.
    ///
    /// Errors: [`RoomError::AlreadyActive`] if the participant was not
    /// pinned (the action has no effect).
    pub fn force_unpin(&mut self, user_id: &str) -> Result<(), RoomError> {
        let before = self.pinned.len();
        self.pinned.retain(|id| id != user_id);
        if self.pinned.len() == before {
            return Err(RoomError::AlreadyActive);
        }
        Ok(())
    }

    /// Silent removal, used when a participant leaves the room. Returns
    /// whether the set changed.
    pub fn remove(&mut self, user_id: &str) -> bool {
        let before = self.pinned.len();
        self.pinned.retain(|id| id != user_id);
        self.pinned.len() != before
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.pinned.iter().any(|id| id == user_id)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.pinned
    }

    pub fn len(&self) -> usize {
        self.pinned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pinned.is_empty()
    }
}

/// Render layout, a pure function of the pin count and screen-share
/// presence. Screen share always takes the spotlight; it does not alter pin
/// membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Grid,
    Spotlight,
    Dual,
}

pub fn layout_mode(pin_count: usize, screen_share_active: bool) -> LayoutMode {
    if screen_share_active {
        return LayoutMode::Spotlight;
    }
    match pin_count {
        0 => LayoutMode::Grid,
        1 => LayoutMode::Spotlight,
        _ => LayoutMode::Dual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_pin_is_rejected_and_set_unchanged() {
        let mut pins = PinSet::new();
        pins.force_pin("a").unwrap();
        pins.force_pin("b").unwrap();
        assert!(matches!(
            pins.force_pin("c"),
            Err(RoomError::PinLimitExceeded)
        ));
        assert_eq!(pins.as_slice(), ["a", "b"]);
    }

    #[test]
    fn duplicate_pin_has_no_effect() {
        let mut pins = PinSet::new();
        pins.force_pin("a").unwrap();
        assert!(matches!(pins.force_pin("a"), Err(RoomError::AlreadyActive)));
        assert_eq!(pins.len(), 1);
    }

    #[test]
    fn unpin_of_absent_member_has_no_effect() {
        let mut pins = PinSet::new();
        assert!(matches!(
            pins.force_unpin("a"),
            Err(RoomError::AlreadyActive)
        ));
    }

    #[test]
    fn unpin_then_repin() {
        let mut pins = PinSet::new();
        pins.force_pin("a").unwrap();
        pins.force_unpin("a").unwrap();
        assert!(pins.is_empty());
        pins.force_pin("a").unwrap();
        assert!(pins.contains("a"));
    }

    #[test]
    fn layout_truth_table() {
        assert_eq!(layout_mode(0, false), LayoutMode::Grid);
        assert_eq!(layout_mode(1, false), LayoutMode::Spotlight);
        assert_eq!(layout_mode(2, false), LayoutMode::Dual);
        // Screen share wins regardless of pins.
        assert_eq!(layout_mode(0, true), LayoutMode::Spotlight);
        assert_eq!(layout_mode(2, true), LayoutMode::Spotlight);
    }
}
