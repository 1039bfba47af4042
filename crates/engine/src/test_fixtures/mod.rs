//! Common builders for engine tests.

use chrono::{DateTime, TimeZone, Utc};
use waymark_domain::{
    Badge, BadgeCategory, BadgeCriteria, BadgeId, BadgeName, BadgeRarity, QuestId, TriggerEvent,
    UserBadgeProgress, UserId, WaypointId,
};

/// Fixed instant used as "now" throughout the tests.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn badge_id(id: &str) -> BadgeId {
    BadgeId::new(id).unwrap()
}

/// A common badge with 10 points awarded for `threshold` events of `event_type`.
pub fn badge(id: &str, event_type: &str, threshold: u32) -> Badge {
    Badge::new(
        badge_id(id),
        BadgeName::new(id).unwrap(),
        BadgeCategory::QuestCompletion,
        BadgeRarity::Common,
        BadgeCriteria::new(event_type, threshold),
        fixed_now(),
    )
    .with_points(10)
}

pub fn progress_row(user_id: &str, badge: &str, progress: u32) -> UserBadgeProgress {
    let mut row = UserBadgeProgress::new(user(user_id), badge_id(badge));
    row.progress = progress;
    row
}

pub fn quest_completed(user_id: &str, quest: &str) -> TriggerEvent {
    TriggerEvent::QuestCompleted {
        quest_id: QuestId::new(quest).unwrap(),
        user_id: user(user_id),
    }
}

pub fn waypoint_reached(user_id: &str, waypoint: &str) -> TriggerEvent {
    TriggerEvent::WaypointReached {
        waypoint_id: WaypointId::new(waypoint).unwrap(),
        quest_id: QuestId::new("q1").unwrap(),
        user_id: user(user_id),
    }
}
