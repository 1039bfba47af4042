//! Waymark domain: badges, per-user progress, trigger and unlock events.
//!
//! Pure types and invariants only. No I/O; storage and transport live in
//! `waymark-engine` behind port traits.

pub mod common;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use entities::{
    sort_by_rarity_desc, Badge, BadgeCategory, BadgeCriteria, BadgeRarity, ProgressUpdate,
    UserBadgeProgress,
};
pub use error::DomainError;
pub use events::{TriggerEvent, TriggerKind, UnlockEvent};
pub use ids::{BadgeId, QuestId, UserId, WaypointId};
pub use value_objects::{
    join_progress, BadgeName, BadgeStats, BadgeWithProgress, BucketCount, STATS_LIST_LIMIT,
};
