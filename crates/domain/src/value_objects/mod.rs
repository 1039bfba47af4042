//! Value objects

mod badge_stats;
mod names;

pub use badge_stats::{join_progress, BadgeStats, BadgeWithProgress, BucketCount, STATS_LIST_LIMIT};
pub use names::BadgeName;
