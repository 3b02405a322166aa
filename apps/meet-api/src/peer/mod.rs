//! Peer broadcast protocol carried over the media transport's data channel.
//!
//! Best-effort, ordered per sender, at-least-once. This channel is a
//! responsiveness optimization only: the enforced, audited version of every
//! privileged action goes through the signaling gateway, which stays the
//! source of truth for persisted state.

pub mod consumer;
pub mod messages;

pub use consumer::{DisableReason, Effect, PeerConsumer};
pub use messages::PeerMessage;
