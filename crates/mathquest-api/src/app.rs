//! Application builder: wires stores, verifier, gateway, and router.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use mathquest_auth::{JwtDecoder, MemoryTokenBlocklist, TokenBlocklist};
use mathquest_core::config::{AppConfig, DirectoryProvider};
use mathquest_core::result::AppResult;
use mathquest_database::repositories::TokenBlacklistRepository;
use mathquest_database::{DatabasePool, DirectoryStore, MemoryDirectoryStore, PgDirectoryStore};
use mathquest_realtime::RealtimeGateway;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Construct the directory store, token verifier, and gateway for the
/// configured provider.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    let directory: Arc<dyn DirectoryStore>;
    let blocklist: Arc<dyn TokenBlocklist>;
    match config.database.provider {
        DirectoryProvider::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            blocklist = Arc::new(TokenBlacklistRepository::new(db.pool().clone()));
            directory = Arc::new(PgDirectoryStore::new(db));
        }
        DirectoryProvider::Memory => {
            warn!("Using the in-memory directory store; data is lost on restart");
            blocklist = Arc::new(MemoryTokenBlocklist::new());
            directory = Arc::new(MemoryDirectoryStore::new());
        }
    }

    info!(provider = ?config.database.provider, "Directory store ready");

    let verifier = Arc::new(JwtDecoder::new(&config.auth, blocklist));
    let gateway = Arc::new(RealtimeGateway::new(
        &config.realtime,
        verifier,
        directory.clone(),
    ));

    Ok(AppState::new(config, gateway, directory))
}
