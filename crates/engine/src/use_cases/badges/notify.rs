//! Notification Emitter.

use std::sync::Arc;

use waymark_domain::UnlockEvent;

use crate::infrastructure::ports::NotificationPort;

/// Hands unlock events to the real-time transport.
///
/// Delivery failures are logged and dropped. Progress is already durable by
/// the time an unlock reaches this point, and clients recover a missed popup
/// by re-reading their stats.
pub struct UnlockNotifier {
    port: Arc<dyn NotificationPort>,
}

impl UnlockNotifier {
    pub fn new(port: Arc<dyn NotificationPort>) -> Self {
        Self { port }
    }

    pub async fn emit(&self, event: &UnlockEvent) {
        if let Err(e) = self.port.publish(event).await {
            tracing::warn!(
                user_id = %event.user_id,
                badge_id = %event.badge.id,
                error = %e,
                "Failed to deliver badge unlock notification"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockNotificationPort, NotifyError};
    use crate::test_fixtures::{badge, fixed_now, user};
    use serde_json::Map;

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let mut port = MockNotificationPort::new();
        port.expect_publish()
            .times(1)
            .returning(|_| Err(NotifyError::Unavailable("socket closed".into())));

        let event = UnlockEvent::new(
            user("u1"),
            badge("first_quest", "quest_completed", 1),
            fixed_now(),
            Map::new(),
        );
        UnlockNotifier::new(Arc::new(port)).emit(&event).await;
    }
}
