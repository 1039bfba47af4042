//! Badge entity - Achievement definitions with unlock criteria
//!
//! Badges are administrator-managed reference data. The event processor
//! only ever reads them; a badge's `id` never changes once created.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::events::TriggerEvent;
use crate::ids::BadgeId;
use crate::value_objects::BadgeName;

/// Closed set of badge categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    QuestCompletion,
    WaypointMilestone,
    Explorer,
    Social,
    Streak,
    Special,
}

impl BadgeCategory {
    pub const ALL: [BadgeCategory; 6] = [
        Self::QuestCompletion,
        Self::WaypointMilestone,
        Self::Explorer,
        Self::Social,
        Self::Streak,
        Self::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuestCompletion => "quest_completion",
            Self::WaypointMilestone => "waypoint_milestone",
            Self::Explorer => "explorer",
            Self::Social => "social",
            Self::Streak => "streak",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for BadgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown badge category: {}", s)))
    }
}

/// Badge scarcity, ordered from `Common` (lowest) to `Legendary` (highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    pub const ALL: [BadgeRarity; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }
}

impl fmt::Display for BadgeRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BadgeRarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown badge rarity: {}", s)))
    }
}

/// What a user has to do to unlock a badge.
///
/// `event_type` is a free string so that catalog entries may reference event
/// kinds this build does not emit; such badges simply never match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCriteria {
    pub event_type: String,
    pub threshold: u32,
    /// Payload fields an event must carry with equal values, e.g. `{"questId": "q1"}`
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub filters: Map<String, Value>,
}

impl BadgeCriteria {
    pub fn new(event_type: impl Into<String>, threshold: u32) -> Self {
        Self {
            event_type: event_type.into(),
            threshold,
            filters: Map::new(),
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// True when the event's kind matches and every filter is satisfied
    /// by the event payload.
    pub fn matches(&self, event: &TriggerEvent) -> bool {
        if self.event_type != event.kind().as_str() {
            return false;
        }
        if self.filters.is_empty() {
            return true;
        }
        let payload = event.to_metadata();
        self.filters
            .iter()
            .all(|(key, expected)| payload.get(key) == Some(expected))
    }
}

/// An achievement definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: BadgeId,
    pub name: BadgeName,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    pub points: u32,
    pub criteria: BadgeCriteria,
    /// Hidden badges are left out of listings until the viewer unlocks them
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Badge {
    pub fn new(
        id: BadgeId,
        name: BadgeName,
        category: BadgeCategory,
        rarity: BadgeRarity,
        criteria: BadgeCriteria,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description: String::new(),
            icon: String::new(),
            category,
            rarity,
            points: 0,
            criteria,
            hidden: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn threshold(&self) -> u32 {
        self.criteria.threshold
    }

    /// Check invariants that serde alone does not enforce.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.criteria.threshold == 0 {
            return Err(DomainError::validation(format!(
                "Badge {} threshold must be at least 1",
                self.id
            )));
        }
        if self.criteria.event_type.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "Badge {} criteria requires an event type",
                self.id
            )));
        }
        Ok(())
    }
}

/// Sort rarer badges first, then by category, then by id.
pub fn sort_by_rarity_desc(badges: &mut [Badge]) {
    badges.sort_by(|a, b| {
        b.rarity
            .cmp(&a.rarity)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{QuestId, UserId};
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn badge(id: &str, rarity: BadgeRarity, criteria: BadgeCriteria) -> Badge {
        Badge::new(
            BadgeId::new(id).unwrap(),
            BadgeName::new(id).unwrap(),
            BadgeCategory::QuestCompletion,
            rarity,
            criteria,
            now(),
        )
    }

    fn quest_completed(quest: &str) -> TriggerEvent {
        TriggerEvent::QuestCompleted {
            quest_id: QuestId::new(quest).unwrap(),
            user_id: UserId::new("u1").unwrap(),
        }
    }

    #[test]
    fn rarity_is_ordered_common_to_legendary() {
        assert!(BadgeRarity::Common < BadgeRarity::Uncommon);
        assert!(BadgeRarity::Epic < BadgeRarity::Legendary);
        let mut sorted = BadgeRarity::ALL;
        sorted.sort();
        assert_eq!(sorted, BadgeRarity::ALL);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in BadgeCategory::ALL {
            assert_eq!(category.as_str().parse::<BadgeCategory>().unwrap(), category);
        }
        assert!("unknown".parse::<BadgeCategory>().is_err());
        assert!("mythic".parse::<BadgeRarity>().is_err());
    }

    #[test]
    fn criteria_matches_on_event_kind() {
        let criteria = BadgeCriteria::new("quest_completed", 1);
        assert!(criteria.matches(&quest_completed("q1")));

        let other = BadgeCriteria::new("waypoint_reached", 1);
        assert!(!other.matches(&quest_completed("q1")));
    }

    #[test]
    fn criteria_filters_restrict_matching() {
        let criteria = BadgeCriteria::new("quest_completed", 1).with_filter("questId", "q42");
        assert!(criteria.matches(&quest_completed("q42")));
        assert!(!criteria.matches(&quest_completed("q1")));
    }

    #[test]
    fn filter_on_absent_field_never_matches() {
        let criteria = BadgeCriteria::new("quest_completed", 1).with_filter("waypointId", "w1");
        assert!(!criteria.matches(&quest_completed("q1")));
    }

    #[test]
    fn zero_threshold_is_invalid() {
        let b = badge("broken", BadgeRarity::Common, BadgeCriteria::new("quest_completed", 0));
        assert!(matches!(b.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_event_type_is_invalid() {
        let b = badge("broken", BadgeRarity::Common, BadgeCriteria::new(" ", 1));
        assert!(b.validate().is_err());
    }

    #[test]
    fn sorts_rarer_badges_first() {
        let mut badges = vec![
            badge("a", BadgeRarity::Common, BadgeCriteria::new("quest_completed", 1)),
            badge("b", BadgeRarity::Legendary, BadgeCriteria::new("quest_completed", 1)),
            badge("c", BadgeRarity::Rare, BadgeCriteria::new("quest_completed", 1)),
        ];
        sort_by_rarity_desc(&mut badges);
        let ids: Vec<_> = badges.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn serializes_camel_case_with_snake_case_enums() {
        let b = badge("first_quest", BadgeRarity::Common, BadgeCriteria::new("quest_completed", 1))
            .with_points(10);
        let value = serde_json::to_value(&b).unwrap();

        assert_eq!(value["category"], json!("quest_completion"));
        assert_eq!(value["rarity"], json!("common"));
        assert_eq!(value["criteria"]["eventType"], json!("quest_completed"));
        assert_eq!(value["criteria"]["threshold"], json!(1));
        assert!(value["criteria"].get("filters").is_none());
        assert_eq!(value["points"], json!(10));
    }
}
