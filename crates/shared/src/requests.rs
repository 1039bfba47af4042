//! Request bodies for the badge admin endpoints.

use serde::{Deserialize, Serialize};
use waymark_domain::{BadgeCategory, BadgeCriteria, BadgeId, BadgeName, BadgeRarity};

/// Body of `POST /api/badges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBadgeRequest {
    pub id: BadgeId,
    pub name: BadgeName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    #[serde(default)]
    pub points: u32,
    pub criteria: BadgeCriteria,
    #[serde(default)]
    pub hidden: bool,
}

/// Body of `PUT /api/badges/{id}`. Absent fields keep their current value;
/// the id itself cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBadgeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<BadgeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BadgeCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<BadgeRarity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<BadgeCriteria>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
}
