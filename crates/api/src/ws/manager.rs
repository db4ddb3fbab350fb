use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use hermas_core::types::{DbId, Timestamp};
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing control frames to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single entry stream connection.
pub struct WsConnection {
    /// The admin who opened the stream.
    pub user_id: DbId,
    /// Channel sender for outbound control frames to this connection.
    pub sender: WsSender,
    pub connected_at: Timestamp,
}

/// Tracks the open entry stream connections.
///
/// Entry events reach each connection through its own bus subscription;
/// the manager only carries control frames (heartbeat pings, shutdown).
/// Thread-safe via interior `RwLock`; shared as `Arc<WsManager>`.
pub struct WsManager {
    connections: RwLock<HashMap<String, WsConnection>>,
}

impl WsManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the control channel so the caller can
    /// forward frames to the WebSocket sink.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Close every stream belonging to `user_id` (after logout or deactivation).
    ///
    /// Returns the number of connections closed.
    pub async fn disconnect_user(&self, user_id: DbId) -> usize {
        let mut conns = self.connections.write().await;
        let ids: Vec<String> = conns
            .iter()
            .filter(|(_, c)| c.user_id == user_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &ids {
            if let Some(conn) = conns.remove(id) {
                let _ = conn.sender.send(Message::Close(None));
            }
        }
        ids.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
