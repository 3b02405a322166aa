//! Control-API client for the external SFU.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::error::RoomError;

use super::token::TokenMinter;

/// The slice of the SFU's control surface this service drives. Join-token
/// minting is local (see [`TokenMinter`]) and not part of this trait.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    async fn ensure_room(&self, room_id: &str, max_participants: u32) -> Result<(), RoomError>;
    async fn delete_room(&self, room_id: &str) -> Result<(), RoomError>;
    async fn mute_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError>;
    async fn remove_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Talks to the SFU's admin REST API, authenticating each call with a
/// short-lived admin token for the target room.
pub struct HttpMediaTransport {
    http: reqwest::Client,
    base_url: String,
    minter: TokenMinter,
}

impl HttpMediaTransport {
    pub fn new(base_url: impl Into<String>, minter: TokenMinter) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            minter,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder, room_id: &str) -> Result<(), RoomError> {
        let token = self.minter.mint_admin_token(room_id)?;
        let response = req
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| RoomError::Transport(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| RoomError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl MediaTransport for HttpMediaTransport {
    async fn ensure_room(&self, room_id: &str, max_participants: u32) -> Result<(), RoomError> {
        let req = self.http.post(format!("{}/api/rooms", self.base_url)).json(&json!({
            "name": room_id,
            "max_participants": max_participants,
            "empty_timeout_secs": 300,
        }));
        self.send(req, room_id).await
    }

    async fn delete_room(&self, room_id: &str) -> Result<(), RoomError> {
        let req = self
            .http
            .delete(format!("{}/api/rooms/{}", self.base_url, room_id));
        self.send(req, room_id).await
    }

    async fn mute_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        let req = self
            .http
            .post(format!(
                "{}/api/rooms/{}/participants/{}/mute",
                self.base_url, room_id, user_id
            ))
            .json(&json!({ "muted": true }));
        self.send(req, room_id).await
    }

    async fn remove_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        let req = self.http.delete(format!(
            "{}/api/rooms/{}/participants/{}",
            self.base_url, room_id, user_id
        ));
        self.send(req, room_id).await
    }
}

// ---------------------------------------------------------------------------
// Null implementation (tests / transport-less deployments)
// ---------------------------------------------------------------------------

/// Records calls instead of performing them. Used by the test suites.
#[derive(Default)]
pub struct NullTransport {
    calls: Mutex<Vec<String>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaTransport for NullTransport {
    async fn ensure_room(&self, room_id: &str, _max_participants: u32) -> Result<(), RoomError> {
        self.record(format!("ensure_room:{room_id}"));
        Ok(())
    }

    async fn delete_room(&self, room_id: &str) -> Result<(), RoomError> {
        self.record(format!("delete_room:{room_id}"));
        Ok(())
    }

    async fn mute_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        self.record(format!("mute:{room_id}:{user_id}"));
        Ok(())
    }

    async fn remove_participant(&self, room_id: &str, user_id: &str) -> Result<(), RoomError> {
        self.record(format!("remove:{room_id}:{user_id}"));
        Ok(())
    }
}
