use std::sync::Arc;

use crate::catalog::CatalogReader;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Media blob store.
    pub store: atelier_storage::ObjectStore,
    /// Live catalog snapshot + subscription source.
    pub catalog: Arc<CatalogReader>,
    /// WebSocket connection manager (catalog feed clients).
    pub ws_manager: Arc<WsManager>,
    /// Bus for publishing catalog change events.
    pub event_bus: Arc<atelier_events::EventBus>,
}
