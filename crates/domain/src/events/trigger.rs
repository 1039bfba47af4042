//! Trigger events - user actions that may advance badge progress.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::ids::{QuestId, UserId, WaypointId};

/// Discriminant of a [`TriggerEvent`], matched against `BadgeCriteria::event_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    QuestCompleted,
    WaypointReached,
    FriendAdded,
    LoginStreak,
    QuestCreated,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 5] = [
        Self::QuestCompleted,
        Self::WaypointReached,
        Self::FriendAdded,
        Self::LoginStreak,
        Self::QuestCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuestCompleted => "quest_completed",
            Self::WaypointReached => "waypoint_reached",
            Self::FriendAdded => "friend_added",
            Self::LoginStreak => "login_streak",
            Self::QuestCreated => "quest_created",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An external occurrence that may advance badge progress.
///
/// Wire format is internally tagged on `type`, with camelCase payload fields:
/// `{"type": "waypoint_reached", "waypointId": "w1", "questId": "q1", "userId": "u1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TriggerEvent {
    QuestCompleted {
        quest_id: QuestId,
        user_id: UserId,
    },
    WaypointReached {
        waypoint_id: WaypointId,
        quest_id: QuestId,
        user_id: UserId,
    },
    FriendAdded {
        user_id: UserId,
        friend_id: UserId,
    },
    LoginStreak {
        user_id: UserId,
        streak: u32,
    },
    QuestCreated {
        quest_id: QuestId,
        user_id: UserId,
    },
}

impl TriggerEvent {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Self::QuestCompleted { .. } => TriggerKind::QuestCompleted,
            Self::WaypointReached { .. } => TriggerKind::WaypointReached,
            Self::FriendAdded { .. } => TriggerKind::FriendAdded,
            Self::LoginStreak { .. } => TriggerKind::LoginStreak,
            Self::QuestCreated { .. } => TriggerKind::QuestCreated,
        }
    }

    /// The user whose progress this event advances.
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::QuestCompleted { user_id, .. }
            | Self::WaypointReached { user_id, .. }
            | Self::FriendAdded { user_id, .. }
            | Self::LoginStreak { user_id, .. }
            | Self::QuestCreated { user_id, .. } => user_id,
        }
    }

    /// Check payload rules that the id newtypes cannot express.
    ///
    /// Ids are already non-empty by construction; this rejects the
    /// remaining malformed shapes before any store is touched.
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::FriendAdded { user_id, friend_id } if user_id == friend_id => Err(
                DomainError::validation("friend_added event cannot befriend oneself"),
            ),
            Self::LoginStreak { streak: 0, .. } => Err(DomainError::validation(
                "login_streak event requires a streak of at least 1",
            )),
            _ => Ok(()),
        }
    }

    /// The event as a flat JSON object, including its `type` tag.
    ///
    /// Used both as unlock metadata and for matching criteria filters.
    pub fn to_metadata(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}
