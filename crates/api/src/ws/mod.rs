//! WebSocket catalog feed.
//!
//! Clients connect to `/api/v1/catalog/ws`, receive the current catalog
//! snapshot, then a frame per catalog change. Connections are tracked by
//! [`WsManager`] and closed on graceful shutdown.

pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use handler::catalog_ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;

use atelier_events::CatalogEvent;
use axum::extract::ws::Message;

use crate::catalog::CatalogSnapshot;

/// Frame sent once on connect: the full current catalog.
pub fn snapshot_frame(snapshot: &CatalogSnapshot) -> Message {
    json_frame(&serde_json::json!({
        "type": "catalog.snapshot",
        "catalog": snapshot,
    }))
}

/// Frame sent on every catalog change.
pub fn update_frame(event: &CatalogEvent) -> Message {
    json_frame(&serde_json::json!({
        "type": "catalog.updated",
        "event": event,
    }))
}

fn json_frame(value: &serde_json::Value) -> Message {
    let text = serde_json::to_string(value).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize WebSocket frame");
        "{}".to_string()
    });
    Message::Text(text.into())
}
