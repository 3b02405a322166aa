//! Signed join credentials for the media transport.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::RoomError;
use crate::models::Role;

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 6 * 60 * 60;

/// Capabilities granted to the holder inside one transport room.
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoGrant {
    pub room: String,
    pub room_join: bool,
    pub room_admin: bool,
    pub can_publish: bool,
    pub can_subscribe: bool,
    pub can_publish_data: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// API key the token was signed with.
    pub iss: String,
    /// Participant identity (user id).
    pub sub: String,
    pub name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

/// Mints HS256 admission tokens from the shared API key/secret the SFU is
/// configured with.
#[derive(Clone)]
pub struct TokenMinter {
    api_key: String,
    api_secret: String,
}

impl TokenMinter {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Join credential for a participant: publish + subscribe + data channel.
    pub fn mint_join_token(
        &self,
        room_id: &str,
        user_id: &str,
        display_name: &str,
        role: Role,
    ) -> Result<String, RoomError> {
        self.mint(
            user_id,
            display_name,
            role.as_str(),
            VideoGrant {
                room: room_id.to_string(),
                room_join: true,
                room_admin: false,
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
            },
        )
    }

    /// Server-side credential for control-API calls against one room.
    pub fn mint_admin_token(&self, room_id: &str) -> Result<String, RoomError> {
        self.mint(
            "meet-api",
            "meet-api",
            "SERVER",
            VideoGrant {
                room: room_id.to_string(),
                room_join: false,
                room_admin: true,
                can_publish: false,
                can_subscribe: false,
                can_publish_data: false,
            },
        )
    }

    fn mint(
        &self,
        identity: &str,
        name: &str,
        role: &str,
        video: VideoGrant,
    ) -> Result<String, RoomError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            iss: self.api_key.clone(),
            sub: identity.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
            video,
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )
        .map_err(|e| RoomError::Transport(format!("token mint failed: {e}")))
    }

    /// Decode and validate a token minted by this key pair.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, RoomError> {
        let data = jsonwebtoken::decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.api_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| RoomError::Transport(format!("token decode failed: {e}")))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_token_carries_room_and_identity() {
        let minter = TokenMinter::new("devkey", "secret");
        let token = minter
            .mint_join_token("room_1", "u1", "Alice", Role::Host)
            .unwrap();

        let claims = minter.decode(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.role, "HOST");
        assert_eq!(claims.video.room, "room_1");
        assert!(claims.video.room_join);
        assert!(claims.video.can_publish_data);
        assert!(!claims.video.room_admin);
    }

    #[test]
    fn admin_token_is_not_a_join_token() {
        let minter = TokenMinter::new("devkey", "secret");
        let token = minter.mint_admin_token("room_1").unwrap();
        let claims = minter.decode(&token).unwrap();
        assert!(claims.video.room_admin);
        assert!(!claims.video.room_join);
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let minter = TokenMinter::new("devkey", "secret");
        let other = TokenMinter::new("devkey", "other-secret");
        let token = minter
            .mint_join_token("room_1", "u1", "Alice", Role::Participant)
            .unwrap();
        assert!(other.decode(&token).is_err());
    }
}
