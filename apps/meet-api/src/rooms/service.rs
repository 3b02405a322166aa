//! Room orchestration: the single write path for room state.
//!
//! Every mutation goes through here so the per-room locking discipline in
//! [`super::registry`] is upheld in one place. The pattern for each
//! operation is: load/seed the room state, apply the mutation synchronously
//! under the room lock while collecting what needs to happen next, release
//! the lock, then persist, call the media transport, and broadcast.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;

use crate::error::RoomError;
use crate::gateway::events::EventName;
use crate::gateway::fanout::GatewayBroadcast;
use crate::media::{MediaTransport, TokenMinter};
use crate::models::{
    AuditLogEntry, MediaPatch, Participant, Recording, RecordingStatus, Role, Room, RoomSummary,
};
use crate::store::RoomStore;

use super::audit::{self, AuditAction};
use super::policy;
use super::recording;
use super::registry::{RoomRegistry, RoomState};

/// A privileged action requested by a moderator through the gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HostAction {
    MuteUser {
        target_user_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    DisableCamera {
        target_user_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    StopScreenshare {
        target_user_id: String,
    },
    KickUser {
        target_user_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    LowerHand {
        target_user_id: String,
    },
    PinUser {
        target_user_id: String,
    },
    UnpinUser {
        target_user_id: String,
    },
    LockRoom,
    UnlockRoom,
    PromoteUser {
        target_user_id: String,
    },
    DemoteUser {
        target_user_id: String,
    },
}

/// Request body for room creation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_participants: Option<u32>,
    pub host_id: String,
}

/// Everything a client needs after being admitted to a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JoinOutcome {
    pub room: Room,
    pub participant: Participant,
    pub participants: Vec<Participant>,
    pub transport_token: String,
    pub transport_url: String,
}

/// Default room capacity when the creator does not specify one.
const DEFAULT_MAX_PARTICIPANTS: u32 = 10;

pub struct RoomService {
    store: Arc<dyn RoomStore>,
    registry: RoomRegistry,
    transport: Arc<dyn MediaTransport>,
    minter: TokenMinter,
    broadcast: GatewayBroadcast,
    transport_url: String,
    /// User ids flagged as system administrators (role policy input).
    admin_user_ids: HashSet<String>,
}

impl RoomService {
    pub fn new(
        store: Arc<dyn RoomStore>,
        transport: Arc<dyn MediaTransport>,
        broadcast: GatewayBroadcast,
        minter: TokenMinter,
        transport_url: impl Into<String>,
        admin_user_ids: HashSet<String>,
    ) -> Self {
        Self {
            store,
            registry: RoomRegistry::new(),
            transport,
            minter,
            broadcast,
            transport_url: transport_url.into(),
            admin_user_ids,
        }
    }

    /// Live state for a room, seeded from the store on first access.
    async fn room_state(&self, room_id: &str) -> Result<Arc<Mutex<RoomState>>, RoomError> {
        if let Some(state) = self.registry.get(room_id) {
            return Ok(state);
        }
        let room = self
            .store
            .get_room(room_id)
            .await?
            .filter(|r| r.is_active)
            .ok_or(RoomError::RoomNotFound)?;
        let participants = self.store.list_active_participants(room_id).await?;
        let recording = self.store.find_active_recording(room_id).await?;
        Ok(self
            .registry
            .insert_seeded(RoomState::new(room, participants, recording)))
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    pub async fn create_room(&self, req: CreateRoomRequest) -> Result<Room, RoomError> {
        let room = Room {
            id: meet_common::id::prefixed_ulid(meet_common::id::prefix::ROOM),
            name: req.name,
            description: req.description,
            max_participants: req.max_participants.unwrap_or(DEFAULT_MAX_PARTICIPANTS),
            is_locked: false,
            is_active: true,
            host_id: req.host_id,
            created_at: Utc::now(),
        };
        self.store.create_room(room.clone()).await?;
        self.transport
            .ensure_room(&room.id, room.max_participants)
            .await?;
        self.registry
            .insert_seeded(RoomState::new(room.clone(), Vec::new(), None));
        tracing::info!(room_id = %room.id, host_id = %room.host_id, "room created");
        Ok(room)
    }

    pub async fn get_room(&self, room_id: &str) -> Result<Room, RoomError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound)
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomSummary>, RoomError> {
        let rooms = self.store.list_active_rooms().await?;
        let mut summaries = Vec::with_capacity(rooms.len());
        for room in rooms {
            let participant_count = self.store.count_active_participants(&room.id).await?;
            summaries.push(RoomSummary {
                room,
                participant_count,
            });
        }
        Ok(summaries)
    }

    /// Deactivate a room and tear down its transport twin. The audit trail
    /// and participant history stay in the store.
    pub async fn close_room(&self, room_id: &str) -> Result<(), RoomError> {
        let mut room = self
            .store
            .get_room(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        room.is_active = false;
        self.store.update_room(&room).await?;
        self.registry.remove(room_id);
        if let Err(e) = self.transport.delete_room(room_id).await {
            tracing::warn!(room_id, error = %e, "failed to delete transport room");
        }
        tracing::info!(room_id, "room closed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Join / leave
    // -----------------------------------------------------------------------

    pub async fn join(
        &self,
        room_id: &str,
        user_id: &str,
        display_name: &str,
    ) -> Result<JoinOutcome, RoomError> {
        let state_arc = self.room_state(room_id).await?;

        let (participant, roster, room, created) = {
            let mut state = state_arc.lock();
            if state.room.is_locked {
                return Err(RoomError::RoomLocked);
            }
            if let Some(existing) = state.participants.get(user_id) {
                // Idempotent rejoin: role and flags are left untouched.
                (existing.clone(), state.roster(), state.room.clone(), false)
            } else {
                if state.active_count() >= state.room.max_participants as usize {
                    return Err(RoomError::RoomFull);
                }
                let role = policy::assign_role(
                    self.admin_user_ids.contains(user_id),
                    user_id,
                    &state.room.host_id,
                );
                let participant = Participant {
                    id: meet_common::id::prefixed_ulid(meet_common::id::prefix::PARTICIPANT),
                    room_id: room_id.to_string(),
                    user_id: user_id.to_string(),
                    display_name: display_name.to_string(),
                    role,
                    is_muted: false,
                    is_camera_off: false,
                    is_screen_sharing: false,
                    is_hand_raised: false,
                    joined_at: Utc::now(),
                    left_at: None,
                };
                state
                    .participants
                    .insert(user_id.to_string(), participant.clone());
                (participant, state.roster(), state.room.clone(), true)
            }
        };

        if created {
            self.store.insert_participant(participant.clone()).await?;
        }
        self.store
            .append_audit(audit::entry(
                room_id,
                user_id,
                &participant.display_name,
                AuditAction::JOIN_ROOM,
                None,
                None,
                "User joined the room",
            ))
            .await?;

        let transport_token =
            self.minter
                .mint_join_token(room_id, user_id, &participant.display_name, participant.role)?;

        self.broadcast.dispatch_room(
            room_id,
            EventName::PRESENCE,
            json!({
                "type": "join",
                "user_id": user_id,
                "user_name": participant.display_name,
                "role": participant.role,
                "timestamp": Utc::now(),
            }),
        );

        tracing::info!(room_id, user_id, role = %participant.role, rejoin = !created, "user joined room");

        Ok(JoinOutcome {
            room,
            participant,
            participants: roster,
            transport_token,
            transport_url: self.transport_url.clone(),
        })
    }

    /// Mark a participant as departed and clean up their ephemeral state.
    /// Idempotent: both an explicit leave and a transport disconnect may
    /// fire for the same session; the second is a no-op. Returns whether
    /// anything changed.
    pub async fn leave(&self, room_id: &str, user_id: &str) -> Result<bool, RoomError> {
        let state_arc = match self.room_state(room_id).await {
            Ok(state) => state,
            Err(RoomError::RoomNotFound) => return Ok(false),
            Err(e) => return Err(e),
        };

        let departed = {
            let mut state = state_arc.lock();
            match state.participants.remove(user_id) {
                None => None,
                Some(mut participant) => {
                    participant.left_at = Some(Utc::now());
                    let hand_changed = state.hand_queue.lower(user_id);
                    let pins_changed = state.pins.remove(user_id);
                    Some((
                        participant,
                        hand_changed.then(|| state.hand_queue.as_slice().to_vec()),
                        pins_changed.then(|| (state.pins.as_slice().to_vec(), state.layout())),
                    ))
                }
            }
        };

        let Some((participant, queue, pins)) = departed else {
            return Ok(false);
        };

        self.store.update_participant(&participant).await?;
        self.store
            .append_audit(audit::entry(
                room_id,
                user_id,
                &participant.display_name,
                AuditAction::LEAVE_ROOM,
                None,
                None,
                "User left the room",
            ))
            .await?;

        self.broadcast.dispatch_room(
            room_id,
            EventName::PRESENCE,
            json!({
                "type": "leave",
                "user_id": user_id,
                "user_name": participant.display_name,
                "timestamp": Utc::now(),
            }),
        );
        if let Some(queue) = queue {
            self.broadcast.dispatch_room(
                room_id,
                EventName::HAND_RAISED,
                json!({
                    "user_id": user_id,
                    "user_name": participant.display_name,
                    "raised": false,
                    "queue": queue,
                }),
            );
        }
        if let Some((pinned, layout)) = pins {
            self.broadcast.dispatch_room(
                room_id,
                EventName::PIN_UPDATE,
                json!({ "pinned": pinned, "layout": layout }),
            );
        }

        tracing::info!(room_id, user_id, "user left room");
        Ok(true)
    }

    pub async fn roster(&self, room_id: &str) -> Result<Vec<Participant>, RoomError> {
        let state_arc = self.room_state(room_id).await?;
        let roster = state_arc.lock().roster();
        Ok(roster)
    }

    // -----------------------------------------------------------------------
    // Device flags and hand raising
    // -----------------------------------------------------------------------

    pub async fn update_media(
        &self,
        room_id: &str,
        user_id: &str,
        patch: MediaPatch,
    ) -> Result<Participant, RoomError> {
        let state_arc = self.room_state(room_id).await?;

        let (participant, queue) = {
            let mut state = state_arc.lock();
            let p = state
                .participants
                .get_mut(user_id)
                .ok_or(RoomError::ParticipantNotFound)?;
            patch.apply(p);
            let participant = p.clone();

            let mut queue = None;
            if let Some(raised) = patch.is_hand_raised {
                let changed = if raised {
                    state.hand_queue.raise(user_id)
                } else {
                    state.hand_queue.lower(user_id)
                };
                if changed {
                    queue = Some(state.hand_queue.as_slice().to_vec());
                }
            }
            (participant, queue)
        };

        self.store.update_participant(&participant).await?;
        self.broadcast.dispatch_room(
            room_id,
            EventName::PARTICIPANT_UPDATE,
            json!({ "user_id": user_id, "updates": patch }),
        );
        if let Some(queue) = queue {
            self.broadcast.dispatch_room(
                room_id,
                EventName::HAND_RAISED,
                json!({
                    "user_id": user_id,
                    "user_name": participant.display_name,
                    "raised": participant.is_hand_raised,
                    "queue": queue,
                }),
            );
        }
        Ok(participant)
    }

    /// Self-service hand raise/lower. Returns the queue in arrival order.
    pub async fn set_hand_raised(
        &self,
        room_id: &str,
        user_id: &str,
        raised: bool,
    ) -> Result<Vec<String>, RoomError> {
        let state_arc = self.room_state(room_id).await?;

        let (participant, queue, changed) = {
            let mut state = state_arc.lock();
            let p = state
                .participants
                .get_mut(user_id)
                .ok_or(RoomError::ParticipantNotFound)?;
            p.is_hand_raised = raised;
            let participant = p.clone();
            let changed = if raised {
                state.hand_queue.raise(user_id)
            } else {
                state.hand_queue.lower(user_id)
            };
            (participant, state.hand_queue.as_slice().to_vec(), changed)
        };

        if changed {
            self.store.update_participant(&participant).await?;
            self.broadcast.dispatch_room(
                room_id,
                EventName::HAND_RAISED,
                json!({
                    "user_id": user_id,
                    "user_name": participant.display_name,
                    "raised": raised,
                    "queue": queue,
                }),
            );
        }
        Ok(queue)
    }

    // -----------------------------------------------------------------------
    // Privileged actions
    // -----------------------------------------------------------------------

    pub async fn host_action(
        &self,
        room_id: &str,
        actor_user_id: &str,
        action: HostAction,
    ) -> Result<(), RoomError> {
        let state_arc = self.room_state(room_id).await?;

        let applied = {
            let mut state = state_arc.lock();
            let actor = state
                .participants
                .get(actor_user_id)
                .ok_or(RoomError::ParticipantNotFound)?
                .clone();
            apply_host_action(&mut state, &actor, &action)?
        };

        for call in &applied.transport {
            let result = match call {
                TransportCall::Mute(user) => self.transport.mute_participant(room_id, user).await,
                TransportCall::Remove(user) => {
                    self.transport.remove_participant(room_id, user).await
                }
            };
            if let Err(e) = result {
                tracing::warn!(room_id, error = %e, "transport call failed after host action");
            }
        }

        for participant in &applied.persist {
            self.store.update_participant(participant).await?;
        }
        if let Some(room) = &applied.room_update {
            self.store.update_room(room).await?;
        }
        if let Some(entry) = applied.audit {
            tracing::info!(
                room_id,
                actor_id = actor_user_id,
                action = %entry.action,
                target_id = entry.target_id.as_deref().unwrap_or("-"),
                "privileged action"
            );
            self.store.append_audit(entry).await?;
        }
        for out in applied.events {
            match out.target {
                Some(user) => self
                    .broadcast
                    .dispatch_user(room_id, &user, out.event, out.data),
                None => self.broadcast.dispatch_room(room_id, out.event, out.data),
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Recordings
    // -----------------------------------------------------------------------

    pub async fn start_recording(
        &self,
        room_id: &str,
        user_id: &str,
    ) -> Result<Recording, RoomError> {
        let state_arc = self.room_state(room_id).await?;

        let (orphaned, new_recording) = {
            let mut state = state_arc.lock();
            let orphaned = match state.recording.take() {
                Some(mut existing) if existing.status == RecordingStatus::Active => {
                    recording::orphan(&mut existing);
                    Some(existing)
                }
                // A `Stopping` recording is awaiting its upload and is not
                // in the way of a new one.
                _ => None,
            };
            let rec = recording::start(room_id, user_id);
            state.recording = Some(rec.clone());
            (orphaned, rec)
        };

        if let Some(orphaned) = &orphaned {
            tracing::warn!(
                room_id,
                recording_id = %orphaned.id,
                "found orphaned active recording, marking as failed"
            );
            self.store.update_recording(orphaned).await?;
        }
        self.store.insert_recording(new_recording.clone()).await?;
        tracing::info!(room_id, recording_id = %new_recording.id, "recording started");
        Ok(new_recording)
    }

    pub async fn stop_recording(
        &self,
        recording_id: &str,
        user_id: &str,
    ) -> Result<Recording, RoomError> {
        let mut rec = self
            .store
            .get_recording(recording_id)
            .await?
            .ok_or(RoomError::RecordingNotFound)?;

        // Serialize with concurrent starts through the room lock when the
        // room is still live.
        let state_arc = match self.room_state(&rec.room_id).await {
            Ok(state) => Some(state),
            Err(RoomError::RoomNotFound) => None,
            Err(e) => return Err(e),
        };

        match state_arc {
            Some(state_arc) => {
                let mut state = state_arc.lock();
                let live = match state.recording.take() {
                    Some(r) if r.id == recording_id => Some(r),
                    other => {
                        state.recording = other;
                        None
                    }
                };
                match live {
                    Some(mut live) => {
                        if let Err(e) = recording::stop(&mut live) {
                            state.recording = Some(live);
                            return Err(e);
                        }
                        rec = live;
                    }
                    None => recording::stop(&mut rec)?,
                }
            }
            None => recording::stop(&mut rec)?,
        }

        self.store.update_recording(&rec).await?;
        tracing::info!(
            recording_id,
            user_id,
            duration_secs = rec.duration_secs.unwrap_or(0),
            "recording stopped"
        );
        Ok(rec)
    }

    pub async fn complete_recording(
        &self,
        recording_id: &str,
        file_url: &str,
        file_size: u64,
    ) -> Result<Recording, RoomError> {
        let mut rec = self
            .store
            .get_recording(recording_id)
            .await?
            .ok_or(RoomError::RecordingNotFound)?;
        recording::complete(&mut rec, file_url, file_size)?;
        self.store.update_recording(&rec).await?;
        tracing::info!(recording_id, file_size, "recording completed");
        Ok(rec)
    }

    pub async fn recordings_for_room(&self, room_id: &str) -> Result<Vec<Recording>, RoomError> {
        self.store.list_recordings(room_id).await
    }

    pub async fn active_recording(&self, room_id: &str) -> Result<Option<Recording>, RoomError> {
        self.store.find_active_recording(room_id).await
    }

    pub async fn list_recordings(
        &self,
        page: usize,
        limit: usize,
    ) -> Result<(Vec<Recording>, usize), RoomError> {
        self.store.list_all_recordings(page, limit).await
    }

    pub async fn delete_recording(&self, recording_id: &str) -> Result<(), RoomError> {
        if !self.store.delete_recording(recording_id).await? {
            return Err(RoomError::RecordingNotFound);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Audit
    // -----------------------------------------------------------------------

    pub async fn audit_log(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<AuditLogEntry>, RoomError> {
        self.store
            .get_room(room_id)
            .await?
            .ok_or(RoomError::RoomNotFound)?;
        self.store.list_audit(room_id, limit, offset).await
    }
}

// ---------------------------------------------------------------------------
// Host-action application (pure, runs under the room lock)
// ---------------------------------------------------------------------------

enum TransportCall {
    Mute(String),
    Remove(String),
}

struct Out {
    event: &'static str,
    target: Option<String>,
    data: Value,
}

#[derive(Default)]
struct Applied {
    audit: Option<AuditLogEntry>,
    persist: Vec<Participant>,
    room_update: Option<Room>,
    events: Vec<Out>,
    transport: Vec<TransportCall>,
}

impl Default for Out {
    fn default() -> Self {
        Self {
            event: EventName::HOST_ACTION,
            target: None,
            data: Value::Null,
        }
    }
}

fn apply_host_action(
    state: &mut RoomState,
    actor: &Participant,
    action: &HostAction,
) -> Result<Applied, RoomError> {
    let room_id = state.room.id.clone();
    let actor_name = actor.display_name.clone();
    let mut applied = Applied::default();

    match action {
        HostAction::MuteUser {
            target_user_id,
            reason,
        } => {
            require(policy::can_moderate(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            if target.is_muted {
                return Err(RoomError::AlreadyActive);
            }
            target.is_muted = true;
            let target = target.clone();
            applied.transport.push(TransportCall::Mute(target_user_id.clone()));
            applied.events.push(Out {
                data: json!({
                    "type": "FORCE_MUTE",
                    "target_user_id": target_user_id,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::MUTE_USER,
                Some(target_user_id),
                Some(&target.display_name),
                reason.clone().unwrap_or_else(|| "Muted by host".to_string()),
            ));
            applied.persist.push(target);
        }

        HostAction::DisableCamera {
            target_user_id,
            reason,
        } => {
            require(policy::can_moderate(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            if target.is_camera_off {
                return Err(RoomError::AlreadyActive);
            }
            target.is_camera_off = true;
            let target = target.clone();
            applied.events.push(Out {
                data: json!({
                    "type": "FORCE_CAMERA_OFF",
                    "target_user_id": target_user_id,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::DISABLE_CAMERA,
                Some(target_user_id),
                Some(&target.display_name),
                reason
                    .clone()
                    .unwrap_or_else(|| "Camera disabled by host".to_string()),
            ));
            applied.persist.push(target);
        }

        HostAction::StopScreenshare { target_user_id } => {
            require(policy::can_moderate(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            if !target.is_screen_sharing {
                return Err(RoomError::AlreadyActive);
            }
            target.is_screen_sharing = false;
            let target = target.clone();
            applied.events.push(Out {
                data: json!({
                    "type": "FORCE_STOP_SCREENSHARE",
                    "target_user_id": target_user_id,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::STOP_SCREENSHARE,
                Some(target_user_id),
                Some(&target.display_name),
                "Screen share stopped by host",
            ));
            applied.persist.push(target);
        }

        HostAction::KickUser {
            target_user_id,
            reason,
        } => {
            require(policy::can_moderate(actor.role))?;
            let mut target = state
                .participants
                .remove(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            target.left_at = Some(Utc::now());
            state.hand_queue.lower(target_user_id);
            let pins_changed = state.pins.remove(target_user_id);

            applied.transport.push(TransportCall::Remove(target_user_id.clone()));
            applied.events.push(Out {
                data: json!({
                    "type": "KICK",
                    "target_user_id": target_user_id,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.events.push(Out {
                event: EventName::KICKED,
                target: Some(target_user_id.clone()),
                data: json!({ "reason": reason }),
            });
            applied.events.push(Out {
                event: EventName::PRESENCE,
                target: None,
                data: json!({
                    "type": "leave",
                    "user_id": target_user_id,
                    "user_name": target.display_name,
                    "timestamp": Utc::now(),
                }),
            });
            if pins_changed {
                applied.events.push(Out {
                    event: EventName::PIN_UPDATE,
                    target: None,
                    data: json!({ "pinned": state.pins.as_slice(), "layout": state.layout() }),
                });
            }
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::KICK_USER,
                Some(target_user_id),
                Some(&target.display_name),
                reason
                    .clone()
                    .unwrap_or_else(|| "Kicked by host".to_string()),
            ));
            applied.persist.push(target);
        }

        HostAction::LowerHand { target_user_id } => {
            require(policy::can_moderate(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            target.is_hand_raised = false;
            let target = target.clone();
            // Lowering a hand that is not raised is a no-op, not an error.
            if state.hand_queue.lower(target_user_id) {
                applied.events.push(Out {
                    event: EventName::HAND_RAISED,
                    target: None,
                    data: json!({
                        "user_id": target_user_id,
                        "user_name": target.display_name,
                        "raised": false,
                        "queue": state.hand_queue.as_slice(),
                    }),
                });
                applied.events.push(Out {
                    event: EventName::HAND_LOWERED,
                    target: Some(target_user_id.clone()),
                    data: json!({ "actor_name": actor_name }),
                });
                applied.audit = Some(audit::entry(
                    &room_id,
                    &actor.user_id,
                    &actor_name,
                    AuditAction::LOWER_HAND,
                    Some(target_user_id),
                    Some(&target.display_name),
                    "Hand lowered by host",
                ));
                applied.persist.push(target);
            }
        }

        HostAction::PinUser { target_user_id } => {
            require(policy::can_moderate(actor.role))?;
            let target = state
                .participants
                .get(target_user_id)
                .ok_or(RoomError::TargetNotFound)?
                .clone();
            state.pins.force_pin(target_user_id)?;
            applied.events.push(Out {
                event: EventName::PIN_UPDATE,
                target: None,
                data: json!({ "pinned": state.pins.as_slice(), "layout": state.layout() }),
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::PIN_USER,
                Some(target_user_id),
                Some(&target.display_name),
                "Pinned for everyone",
            ));
        }

        HostAction::UnpinUser { target_user_id } => {
            require(policy::can_moderate(actor.role))?;
            state.pins.force_unpin(target_user_id)?;
            applied.events.push(Out {
                event: EventName::PIN_UPDATE,
                target: None,
                data: json!({ "pinned": state.pins.as_slice(), "layout": state.layout() }),
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::UNPIN_USER,
                Some(target_user_id),
                None,
                "Unpinned for everyone",
            ));
        }

        HostAction::LockRoom => {
            require(policy::can_manage_room(actor.role))?;
            if state.room.is_locked {
                return Err(RoomError::AlreadyActive);
            }
            state.room.is_locked = true;
            applied.room_update = Some(state.room.clone());
            applied.events.push(Out {
                event: EventName::LOCKED,
                target: None,
                data: json!({ "actor_name": actor_name }),
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::LOCK_ROOM,
                None,
                None,
                "Room locked",
            ));
        }

        HostAction::UnlockRoom => {
            require(policy::can_manage_room(actor.role))?;
            if !state.room.is_locked {
                return Err(RoomError::AlreadyActive);
            }
            state.room.is_locked = false;
            applied.room_update = Some(state.room.clone());
            applied.events.push(Out {
                event: EventName::UNLOCKED,
                target: None,
                data: json!({ "actor_name": actor_name }),
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::UNLOCK_ROOM,
                None,
                None,
                "Room unlocked",
            ));
        }

        HostAction::PromoteUser { target_user_id } => {
            require(policy::can_manage_room(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            if target.role != Role::Participant {
                return Err(RoomError::AlreadyActive);
            }
            target.role = Role::Cohost;
            let target = target.clone();
            applied.events.push(Out {
                data: json!({
                    "type": "PROMOTE",
                    "target_user_id": target_user_id,
                    "new_role": Role::Cohost,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::PROMOTE_COHOST,
                Some(target_user_id),
                Some(&target.display_name),
                "Promoted to co-host",
            ));
            applied.persist.push(target);
        }

        HostAction::DemoteUser { target_user_id } => {
            require(policy::can_manage_room(actor.role))?;
            let target = state
                .participants
                .get_mut(target_user_id)
                .ok_or(RoomError::TargetNotFound)?;
            if target.role != Role::Cohost {
                return Err(RoomError::AlreadyActive);
            }
            target.role = Role::Participant;
            let target = target.clone();
            applied.events.push(Out {
                data: json!({
                    "type": "DEMOTE",
                    "target_user_id": target_user_id,
                    "new_role": Role::Participant,
                    "actor_name": actor_name,
                }),
                ..Out::default()
            });
            applied.audit = Some(audit::entry(
                &room_id,
                &actor.user_id,
                &actor_name,
                AuditAction::DEMOTE_USER,
                Some(target_user_id),
                Some(&target.display_name),
                "Demoted to participant",
            ));
            applied.persist.push(target);
        }
    }

    Ok(applied)
}

fn require(allowed: bool) -> Result<(), RoomError> {
    if allowed {
        Ok(())
    } else {
        Err(RoomError::InsufficientPermission)
    }
}
