//! Unlock events - emitted once per (user, badge) transition to unlocked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::Badge;
use crate::ids::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockEvent {
    pub user_id: UserId,
    pub badge: Badge,
    pub timestamp: DateTime<Utc>,
    /// The triggering event payload
    pub metadata: Map<String, Value>,
}

impl UnlockEvent {
    pub fn new(
        user_id: UserId,
        badge: Badge,
        timestamp: DateTime<Utc>,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            user_id,
            badge,
            timestamp,
            metadata,
        }
    }
}
