//! WebSocket fan-out for unlock notifications.

use async_trait::async_trait;
use waymark_domain::UnlockEvent;
use waymark_shared::ServerMessage;

use super::connections::SharedConnectionManager;
use crate::infrastructure::ports::{NotificationPort, NotifyError};

/// Publishes `badge_unlocked` to every open socket of the unlocking user.
///
/// A user with no open sockets is not an error; they will see the unlock
/// the next time they load their badges.
pub struct WebSocketNotifier {
    connections: SharedConnectionManager,
}

impl WebSocketNotifier {
    pub fn new(connections: SharedConnectionManager) -> Self {
        Self { connections }
    }
}

#[async_trait]
impl NotificationPort for WebSocketNotifier {
    async fn publish(&self, event: &UnlockEvent) -> Result<(), NotifyError> {
        let report = self
            .connections
            .send_to_user(&event.user_id, ServerMessage::badge_unlocked(event.clone()))
            .await;

        tracing::debug!(
            user_id = %event.user_id,
            badge_id = %event.badge.id,
            connections = report.attempted,
            "Published badge unlock"
        );

        if report.failed > 0 {
            return Err(NotifyError::Delivery {
                attempted: report.attempted,
                failed: report.failed,
            });
        }
        Ok(())
    }
}
