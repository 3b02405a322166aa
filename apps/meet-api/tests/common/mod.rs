#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use meet_api::config::Config;
use meet_api::gateway::fanout::GatewayBroadcast;
use meet_api::gateway::registry::RoomConnections;
use meet_api::media::{NullTransport, TokenMinter};
use meet_api::models::Room;
use meet_api::rooms::{CreateRoomRequest, RoomService};
use meet_api::store::MemoryStore;
use meet_api::AppState;
use meet_common::SnowflakeGenerator;

/// Everything a test needs: the app state plus handles on the fakes.
pub struct TestContext {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub transport: Arc<NullTransport>,
}

/// Build an [`AppState`] wired to the in-memory store and a null media
/// transport. `admins` become system administrators for role assignment.
pub fn build_state(admins: &[&str]) -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(NullTransport::new());
    let minter = TokenMinter::new("devkey", "secret");
    let broadcast = GatewayBroadcast::new();

    let admin_user_ids: HashSet<String> = admins.iter().map(|s| s.to_string()).collect();

    let service = Arc::new(RoomService::new(
        store.clone(),
        transport.clone(),
        broadcast.clone(),
        minter,
        "ws://localhost:7880",
        admin_user_ids,
    ));

    let config = Config {
        port: 0,
        transport_url: "ws://localhost:7880".to_string(),
        transport_api_url: "http://localhost:7880".to_string(),
        transport_api_key: "devkey".to_string(),
        transport_api_secret: "secret".to_string(),
        admin_user_ids: admins.iter().map(|s| s.to_string()).collect(),
    };

    TestContext {
        state: AppState {
            config: Arc::new(config),
            service,
            broadcast,
            connections: Arc::new(RoomConnections::new()),
            snowflake: Arc::new(SnowflakeGenerator::new(0)),
        },
        store,
        transport,
    }
}

/// Create a room hosted by `host_id` with the given capacity.
pub async fn create_room(ctx: &TestContext, host_id: &str, capacity: u32) -> Room {
    ctx.state
        .service
        .create_room(CreateRoomRequest {
            name: "Test Room".to_string(),
            description: None,
            max_participants: Some(capacity),
            host_id: host_id.to_string(),
        })
        .await
        .expect("create room")
}
