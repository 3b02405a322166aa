pub mod config;
pub mod error;
pub mod gateway;
pub mod media;
pub mod models;
pub mod peer;
pub mod rooms;
pub mod routes;
pub mod store;

use std::sync::Arc;

use config::Config;
use gateway::fanout::GatewayBroadcast;
use gateway::registry::RoomConnections;
use meet_common::SnowflakeGenerator;
use rooms::RoomService;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub service: Arc<RoomService>,
    pub broadcast: GatewayBroadcast,
    pub connections: Arc<RoomConnections>,
    pub snowflake: Arc<SnowflakeGenerator>,
}
