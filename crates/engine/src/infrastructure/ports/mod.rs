//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Ports exist for:
//! - Badge and progress storage (SQLite or in-memory)
//! - Unlock notifications (WebSocket fan-out)
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

pub use error::{NotifyError, RepoError};
pub use external::NotificationPort;
pub use repos::{BadgeCatalogRepo, BadgeProgressRepo};
pub use testing::ClockPort;

#[cfg(test)]
pub use external::MockNotificationPort;
#[cfg(test)]
pub use repos::{MockBadgeCatalogRepo, MockBadgeProgressRepo};
#[cfg(test)]
pub use testing::MockClockPort;
