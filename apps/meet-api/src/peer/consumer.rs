//! Client-side application rules for the peer broadcast channel.
//!
//! The channel is at-least-once and unordered across senders, so every
//! handler here is idempotent. Nothing in this state machine is
//! authoritative — the gateway's dispatches are; the consumer only makes
//! the local UI react before the signaling round trip completes.

use crate::peer::messages::PeerMessage;
use crate::rooms::hand_raise::HandRaiseQueue;
use crate::rooms::pins::{layout_mode, LayoutMode, PinSet};

/// Why the local microphone must be turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisableReason {
    ModeratorCommand,
    MicsLocked,
}

/// Device-level action the embedding client must execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    DisableMic(DisableReason),
    DisableCamera,
    StopScreenShare,
    LowerHand,
    LeaveRoom,
}

/// Per-client view of the ephemeral room state driven by peer messages.
pub struct PeerConsumer {
    identity: String,
    privileged: bool,
    mics_locked: bool,
    departed: bool,
    raised_hands: HandRaiseQueue,
    pins: PinSet,
}

impl PeerConsumer {
    pub fn new(identity: impl Into<String>, privileged: bool) -> Self {
        Self {
            identity: identity.into(),
            privileged,
            mics_locked: false,
            departed: false,
            raised_hands: HandRaiseQueue::new(),
            pins: PinSet::new(),
        }
    }

    /// Apply one incoming message and return the device actions it demands.
    pub fn apply(&mut self, msg: &PeerMessage) -> Vec<Effect> {
        if self.departed {
            return Vec::new();
        }

        match msg {
            PeerMessage::HandRaise {
                participant_id,
                raised,
            } => {
                if *raised {
                    self.raised_hands.raise(participant_id);
                } else {
                    self.raised_hands.lower(participant_id);
                }
                Vec::new()
            }

            PeerMessage::AdminLockMics { locked } => {
                self.mics_locked = *locked;
                if *locked && !self.privileged {
                    vec![Effect::DisableMic(DisableReason::MicsLocked)]
                } else {
                    Vec::new()
                }
            }

            PeerMessage::AdminForcePin { target_id } => {
                // Full set or duplicate: keep the existing pins unchanged.
                let _ = self.pins.force_pin(target_id);
                Vec::new()
            }

            PeerMessage::AdminForceUnpin { target_id } => {
                let _ = self.pins.force_unpin(target_id);
                Vec::new()
            }

            PeerMessage::AdminMute { target_id } => self.targeted(target_id, || {
                vec![Effect::DisableMic(DisableReason::ModeratorCommand)]
            }),

            PeerMessage::AdminDisableCamera { target_id } => {
                self.targeted(target_id, || vec![Effect::DisableCamera])
            }

            PeerMessage::AdminStopScreenshare { target_id } => {
                self.targeted(target_id, || vec![Effect::StopScreenShare])
            }

            PeerMessage::AdminKick { target_id } => {
                if target_id != &self.identity {
                    return Vec::new();
                }
                self.departed = true;
                vec![Effect::LeaveRoom]
            }

            PeerMessage::AdminLowerHand { target_id } => {
                if target_id != &self.identity {
                    return Vec::new();
                }
                if self.raised_hands.lower(&self.identity) {
                    vec![Effect::LowerHand]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn targeted(&self, target_id: &str, effects: impl FnOnce() -> Vec<Effect>) -> Vec<Effect> {
        if target_id == self.identity {
            effects()
        } else {
            Vec::new()
        }
    }

    /// Standing policy hook: the client calls this whenever its microphone
    /// becomes enabled, by any means. While mics are locked, a
    /// non-privileged mic is immediately re-disabled.
    pub fn on_mic_enabled(&self) -> Vec<Effect> {
        if self.mics_locked && !self.privileged {
            vec![Effect::DisableMic(DisableReason::MicsLocked)]
        } else {
            Vec::new()
        }
    }

    /// Record the local user raising or lowering their own hand (the data
    /// channel does not echo messages back to the sender).
    pub fn set_local_hand_raised(&mut self, raised: bool) {
        if raised {
            self.raised_hands.raise(&self.identity);
        } else {
            self.raised_hands.lower(&self.identity);
        }
    }

    /// Role changes arrive via the gateway; the consumer only mirrors the
    /// privilege bit for the mic-lock policy.
    pub fn set_privileged(&mut self, privileged: bool) {
        self.privileged = privileged;
    }

    /// Reconnect reset. The mic lock is not persisted anywhere, so a fresh
    /// session resumes unlocked until a moderator re-broadcasts it.
    pub fn reset(&mut self) {
        self.mics_locked = false;
        self.departed = false;
        self.raised_hands = HandRaiseQueue::new();
        self.pins = PinSet::new();
    }

    pub fn mics_locked(&self) -> bool {
        self.mics_locked
    }

    pub fn raised_hands(&self) -> &[String] {
        self.raised_hands.as_slice()
    }

    /// 1-based position of a raised hand, if any.
    pub fn hand_position(&self, participant_id: &str) -> Option<usize> {
        self.raised_hands.position(participant_id)
    }

    pub fn pinned(&self) -> &[String] {
        self.pins.as_slice()
    }

    pub fn layout(&self, screen_share_active: bool) -> LayoutMode {
        layout_mode(self.pins.len(), screen_share_active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mute(target: &str) -> PeerMessage {
        PeerMessage::AdminMute {
            target_id: target.to_string(),
        }
    }

    fn raise(participant: &str, raised: bool) -> PeerMessage {
        PeerMessage::HandRaise {
            participant_id: participant.to_string(),
            raised,
        }
    }

    #[test]
    fn targeted_message_for_someone_else_is_ignored() {
        let mut consumer = PeerConsumer::new("me", false);
        assert!(consumer.apply(&mute("other")).is_empty());
        assert_eq!(
            consumer.apply(&mute("me")),
            vec![Effect::DisableMic(DisableReason::ModeratorCommand)]
        );
    }

    #[test]
    fn hand_raise_queue_is_fifo_and_idempotent() {
        let mut consumer = PeerConsumer::new("me", false);
        consumer.apply(&raise("a", true));
        consumer.apply(&raise("b", true));
        // Duplicate delivery of a's raise changes nothing.
        consumer.apply(&raise("a", true));
        assert_eq!(consumer.raised_hands(), ["a", "b"]);
        assert_eq!(consumer.hand_position("b"), Some(2));

        consumer.apply(&raise("a", false));
        assert_eq!(consumer.raised_hands(), ["b"]);
    }

    #[test]
    fn duplicate_kick_is_a_noop() {
        let mut consumer = PeerConsumer::new("me", false);
        let kick = PeerMessage::AdminKick {
            target_id: "me".to_string(),
        };
        assert_eq!(consumer.apply(&kick), vec![Effect::LeaveRoom]);
        // Redelivered kick: already departed, nothing to do.
        assert!(consumer.apply(&kick).is_empty());
    }

    #[test]
    fn lock_mics_is_a_standing_policy() {
        let mut consumer = PeerConsumer::new("me", false);
        let effects = consumer.apply(&PeerMessage::AdminLockMics { locked: true });
        assert_eq!(effects, vec![Effect::DisableMic(DisableReason::MicsLocked)]);

        // Mic comes up again later, by any means: re-disabled.
        assert_eq!(
            consumer.on_mic_enabled(),
            vec![Effect::DisableMic(DisableReason::MicsLocked)]
        );

        consumer.apply(&PeerMessage::AdminLockMics { locked: false });
        assert!(consumer.on_mic_enabled().is_empty());
    }

    #[test]
    fn lock_mics_spares_privileged_participants() {
        let mut consumer = PeerConsumer::new("host", true);
        assert!(consumer
            .apply(&PeerMessage::AdminLockMics { locked: true })
            .is_empty());
        assert!(consumer.on_mic_enabled().is_empty());
    }

    #[test]
    fn lock_does_not_survive_a_reconnect() {
        let mut consumer = PeerConsumer::new("me", false);
        consumer.apply(&PeerMessage::AdminLockMics { locked: true });
        consumer.reset();
        assert!(!consumer.mics_locked());
        assert!(consumer.on_mic_enabled().is_empty());
    }

    #[test]
    fn force_pin_respects_the_shared_limit() {
        let mut consumer = PeerConsumer::new("me", false);
        for target in ["a", "b", "c", "a"] {
            consumer.apply(&PeerMessage::AdminForcePin {
                target_id: target.to_string(),
            });
        }
        assert_eq!(consumer.pinned(), ["a", "b"]);
        assert_eq!(consumer.layout(false), LayoutMode::Dual);

        consumer.apply(&PeerMessage::AdminForceUnpin {
            target_id: "a".to_string(),
        });
        assert_eq!(consumer.pinned(), ["b"]);
        assert_eq!(consumer.layout(false), LayoutMode::Spotlight);
        // Screen share takes precedence at render time.
        assert_eq!(consumer.layout(true), LayoutMode::Spotlight);
    }

    #[test]
    fn lower_hand_of_unraised_hand_is_a_noop() {
        let mut consumer = PeerConsumer::new("me", false);
        let lower = PeerMessage::AdminLowerHand {
            target_id: "me".to_string(),
        };
        assert!(consumer.apply(&lower).is_empty());

        consumer.set_local_hand_raised(true);
        assert_eq!(consumer.apply(&lower), vec![Effect::LowerHand]);
    }
}
