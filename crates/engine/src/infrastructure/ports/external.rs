//! External service ports.

use async_trait::async_trait;
use waymark_domain::UnlockEvent;

use super::error::NotifyError;

/// Real-time publish capability for unlock notifications.
///
/// Delivery is best-effort; callers log failures and move on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn publish(&self, event: &UnlockEvent) -> Result<(), NotifyError>;
}
