use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meet_api::config::Config;
use meet_api::gateway::fanout::GatewayBroadcast;
use meet_api::gateway::registry::RoomConnections;
use meet_api::media::{HttpMediaTransport, TokenMinter};
use meet_api::rooms::RoomService;
use meet_api::store::MemoryStore;
use meet_api::AppState;
use meet_common::SnowflakeGenerator;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing — env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    // In-memory store for single-process deployments. Replace with the
    // SQL-backed implementation when running against the CRUD layer.
    let store = Arc::new(MemoryStore::new());

    let minter = TokenMinter::new(
        config.transport_api_key.clone(),
        config.transport_api_secret.clone(),
    );
    let transport = Arc::new(HttpMediaTransport::new(
        config.transport_api_url.clone(),
        minter.clone(),
    ));

    let broadcast = GatewayBroadcast::new();
    let admin_user_ids: HashSet<String> = config.admin_user_ids.iter().cloned().collect();

    let service = Arc::new(RoomService::new(
        store,
        transport,
        broadcast.clone(),
        minter,
        config.transport_url.clone(),
        admin_user_ids,
    ));

    tracing::info!(
        transport_url = %config.transport_url,
        admins = config.admin_user_ids.len(),
        "meet-api configured"
    );

    let state = AppState {
        config: Arc::new(config),
        service,
        broadcast,
        connections: Arc::new(RoomConnections::new()),
        snowflake: Arc::new(SnowflakeGenerator::new(0)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(meet_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "meet-api listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
