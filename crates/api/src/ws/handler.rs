use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to the catalog WebSocket feed.
///
/// After the upgrade the client receives the current catalog snapshot,
/// is registered with `WsManager`, and then receives a frame per catalog
/// change until it disconnects.
pub async fn catalog_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single catalog-feed connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Sends the synchronous initial snapshot.
///   2. Registers the connection with `WsManager`.
///   3. Spawns a sender task that forwards update frames from the manager.
///   4. Drains inbound messages on the current task.
///   5. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "Catalog feed connected");

    let (mut sink, mut stream) = socket.split();

    // Initial state first, so the client never renders from nothing.
    let snapshot = state.catalog.snapshot().await;
    if sink
        .send(crate::ws::snapshot_frame(&snapshot))
        .await
        .is_err()
    {
        tracing::debug!(conn_id = %conn_id, "Client went away before the snapshot was sent");
        return;
    }

    // Register and get the receiver for outbound update frames.
    let ws_manager: Arc<WsManager> = Arc::clone(&state.ws_manager);
    let mut rx = ws_manager.add(conn_id.clone()).await;

    // Sender task: forward manager messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: the feed is one-way; inbound traffic is only drained
    // for protocol frames.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_msg) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "Catalog feed disconnected");
}
