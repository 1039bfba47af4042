//! Connection management for WebSocket clients.
//!
//! Tracks connected clients by user so unlock notifications can be routed to
//! every open tab of the user who earned them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use waymark_domain::UserId;
use waymark_shared::ServerMessage;

/// Information about a connected client.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection
    pub connection_id: Uuid,
    pub user_id: UserId,
}

/// Outcome of a per-user send.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendReport {
    pub attempted: usize,
    pub failed: usize,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

pub type SharedConnectionManager = Arc<ConnectionManager>;

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(
        &self,
        connection_id: Uuid,
        user_id: UserId,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            user_id,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    pub async fn get(&self, connection_id: Uuid) -> Option<ConnectionInfo> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|(info, _)| info.clone())
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a message to every connection belonging to `user_id`.
    ///
    /// Never blocks: a full or closed channel counts as a failed delivery.
    pub async fn send_to_user(&self, user_id: &UserId, message: ServerMessage) -> SendReport {
        let connections = self.connections.read().await;
        let mut report = SendReport::default();
        for (info, sender) in connections.values() {
            if &info.user_id != user_id {
                continue;
            }
            report.attempted += 1;
            if let Err(e) = sender.try_send(message.clone()) {
                report.failed += 1;
                tracing::warn!(
                    connection_id = %info.connection_id,
                    user_id = %user_id,
                    error = %e,
                    "Failed to send message to user"
                );
            }
        }
        report
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn send_to_user_reaches_only_that_users_connections() {
        let manager = ConnectionManager::new();
        let (tx_a1, mut rx_a1) = mpsc::channel(4);
        let (tx_a2, mut rx_a2) = mpsc::channel(4);
        let (tx_b, mut rx_b) = mpsc::channel(4);
        manager.register(Uuid::new_v4(), user("alice"), tx_a1).await;
        manager.register(Uuid::new_v4(), user("alice"), tx_a2).await;
        manager.register(Uuid::new_v4(), user("bob"), tx_b).await;

        let report = manager.send_to_user(&user("alice"), ServerMessage::Pong).await;

        assert_eq!(report, SendReport { attempted: 2, failed: 0 });
        assert_eq!(rx_a1.try_recv().unwrap(), ServerMessage::Pong);
        assert_eq!(rx_a2.try_recv().unwrap(), ServerMessage::Pong);
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn full_channel_counts_as_failure() {
        let manager = ConnectionManager::new();
        let (tx, _rx) = mpsc::channel(1);
        manager.register(Uuid::new_v4(), user("alice"), tx).await;

        manager.send_to_user(&user("alice"), ServerMessage::Pong).await;
        let report = manager.send_to_user(&user("alice"), ServerMessage::Pong).await;

        assert_eq!(report, SendReport { attempted: 1, failed: 1 });
    }

    #[tokio::test]
    async fn unregister_removes_connection() {
        let manager = ConnectionManager::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(1);
        manager.register(id, user("alice"), tx).await;
        assert!(manager.get(id).await.is_some());

        manager.unregister(id).await;
        assert!(manager.get(id).await.is_none());
        assert_eq!(manager.connection_count().await, 0);
    }
}
