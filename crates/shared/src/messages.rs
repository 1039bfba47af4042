//! WebSocket message types
//!
//! Every frame is a JSON object tagged on `type`. The engine only pushes;
//! the single client message is a keep-alive.

use serde::{Deserialize, Serialize};
use waymark_domain::{UnlockEvent, UserId};

// =============================================================================
// Client Messages (browser -> engine)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Application-level keep-alive, answered with [`ServerMessage::Pong`]
    Ping,
    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (engine -> browser)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Sent once after the socket is registered
    ConnectionEstablished { user_id: UserId },
    /// A badge was unlocked for the connected user
    BadgeUnlocked { data: UnlockEvent },
    Pong,
    Error { code: String, message: String },
}

impl ServerMessage {
    pub fn badge_unlocked(event: UnlockEvent) -> Self {
        Self::BadgeUnlocked { data: event }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Map};
    use waymark_domain::{Badge, BadgeCategory, BadgeCriteria, BadgeId, BadgeName, BadgeRarity};

    #[test]
    fn badge_unlocked_wire_shape() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let badge = Badge::new(
            BadgeId::new("first_quest").unwrap(),
            BadgeName::new("First Quest").unwrap(),
            BadgeCategory::QuestCompletion,
            BadgeRarity::Common,
            BadgeCriteria::new("quest_completed", 1),
            now,
        );
        let event = UnlockEvent::new(UserId::new("u1").unwrap(), badge, now, Map::new());

        let value = serde_json::to_value(ServerMessage::badge_unlocked(event)).unwrap();
        assert_eq!(value["type"], json!("badge_unlocked"));
        assert_eq!(value["data"]["userId"], json!("u1"));
        assert_eq!(value["data"]["badge"]["id"], json!("first_quest"));
    }

    #[test]
    fn pong_is_a_bare_tag() {
        let value = serde_json::to_value(ServerMessage::Pong).unwrap();
        assert_eq!(value, json!({"type": "pong"}));
    }

    #[test]
    fn connection_established_carries_user() {
        let msg = ServerMessage::ConnectionEstablished {
            user_id: UserId::new("u1").unwrap(),
        };
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(value, json!({"type": "connection_established", "userId": "u1"}));
    }

    #[test]
    fn client_ping_and_unknown() {
        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, ClientMessage::Ping);

        let other: ClientMessage = serde_json::from_str(r#"{"type":"subscribe"}"#).unwrap();
        assert_eq!(other, ClientMessage::Unknown);
    }
}
