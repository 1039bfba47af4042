//! Domain entities

mod badge;
mod badge_progress;

pub use badge::{sort_by_rarity_desc, Badge, BadgeCategory, BadgeCriteria, BadgeRarity};
pub use badge_progress::{ProgressUpdate, UserBadgeProgress};
