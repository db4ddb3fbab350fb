use std::sync::Arc;

use crate::auth::google::IdentityVerifier;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hermas_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live entry stream connections.
    pub ws_manager: Arc<WsManager>,
    /// Entry change events fan out from here to stream subscribers.
    pub event_bus: Arc<hermas_events::EventBus>,
    /// Verifies Google ID tokens at sign-in.
    pub identity: Arc<dyn IdentityVerifier>,
}
