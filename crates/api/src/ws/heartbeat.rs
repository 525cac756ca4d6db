use std::sync::Arc;
use std::time::Duration;

use crate::ws::manager::WsManager;

/// Interval between keep-alive pings.
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn the heartbeat task: ping every connection on a fixed interval so
/// idle catalog-feed connections survive proxies and dead peers get
/// detected. Aborted by the caller on shutdown.
pub fn start_heartbeat(ws_manager: Arc<WsManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));
        loop {
            interval.tick().await;
            ws_manager.ping_all().await;
        }
    })
}
