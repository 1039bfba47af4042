//! Read-side badge projections
//!
//! [`BadgeStats::compute`] is a pure function of the catalog and one user's
//! progress rows. Badges without a row count as locked with zero progress.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::entities::{Badge, BadgeCategory, BadgeRarity, UserBadgeProgress};
use crate::ids::{BadgeId, UserId};

/// Maximum entries in `recent_unlocks` and `next_closest_badges`
pub const STATS_LIST_LIMIT: usize = 5;

/// A badge paired with one user's progress against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeWithProgress {
    #[serde(flatten)]
    pub badge: Badge,
    pub user_progress: UserBadgeProgress,
}

impl BadgeWithProgress {
    pub fn is_unlocked(&self) -> bool {
        self.user_progress.is_unlocked
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub total: u32,
    pub unlocked: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStats {
    pub total_badges: u32,
    pub unlocked_badges: u32,
    pub locked_badges: u32,
    pub total_points: u64,
    pub by_rarity: BTreeMap<BadgeRarity, BucketCount>,
    pub by_type: BTreeMap<BadgeCategory, BucketCount>,
    pub recent_unlocks: Vec<BadgeWithProgress>,
    pub next_closest_badges: Vec<BadgeWithProgress>,
}

/// Join the catalog with a user's rows, substituting zero records for
/// badges the user has never progressed. Catalog order is preserved.
pub fn join_progress(
    user_id: &UserId,
    badges: &[Badge],
    progress: &[UserBadgeProgress],
) -> Vec<BadgeWithProgress> {
    let by_badge: HashMap<&BadgeId, &UserBadgeProgress> =
        progress.iter().map(|p| (&p.badge_id, p)).collect();

    badges
        .iter()
        .map(|badge| BadgeWithProgress {
            badge: badge.clone(),
            user_progress: by_badge
                .get(&badge.id)
                .map(|p| (*p).clone())
                .unwrap_or_else(|| UserBadgeProgress::new(user_id.clone(), badge.id.clone())),
        })
        .collect()
}

impl BadgeStats {
    pub fn compute(user_id: &UserId, badges: &[Badge], progress: &[UserBadgeProgress]) -> Self {
        let joined = join_progress(user_id, badges, progress);

        let mut by_rarity: BTreeMap<BadgeRarity, BucketCount> = BadgeRarity::ALL
            .into_iter()
            .map(|r| (r, BucketCount::default()))
            .collect();
        let mut by_type: BTreeMap<BadgeCategory, BucketCount> = BadgeCategory::ALL
            .into_iter()
            .map(|c| (c, BucketCount::default()))
            .collect();

        let mut unlocked_badges = 0u32;
        let mut total_points = 0u64;

        for entry in &joined {
            let unlocked = entry.is_unlocked();
            let rarity = by_rarity.entry(entry.badge.rarity).or_default();
            let category = by_type.entry(entry.badge.category).or_default();
            rarity.total += 1;
            category.total += 1;
            if unlocked {
                rarity.unlocked += 1;
                category.unlocked += 1;
                unlocked_badges += 1;
                total_points += u64::from(entry.badge.points);
            }
        }

        let total_badges = u32::try_from(joined.len()).unwrap_or(u32::MAX);

        let (mut recent_unlocks, mut next_closest_badges): (Vec<_>, Vec<_>) =
            joined.into_iter().partition(BadgeWithProgress::is_unlocked);

        recent_unlocks.sort_by(|a, b| {
            b.user_progress
                .unlocked_at
                .cmp(&a.user_progress.unlocked_at)
                .then_with(|| a.badge.id.cmp(&b.badge.id))
        });
        recent_unlocks.truncate(STATS_LIST_LIMIT);

        // Compare p_a/t_a against p_b/t_b as p_a*t_b vs p_b*t_a.
        next_closest_badges.sort_by(|a, b| {
            let (pa, ta) = a.user_progress.ratio(a.badge.threshold());
            let (pb, tb) = b.user_progress.ratio(b.badge.threshold());
            (pb * ta)
                .cmp(&(pa * tb))
                .then_with(|| a.badge.id.cmp(&b.badge.id))
        });
        next_closest_badges.truncate(STATS_LIST_LIMIT);

        Self {
            total_badges,
            unlocked_badges,
            locked_badges: total_badges - unlocked_badges,
            total_points,
            by_rarity,
            by_type,
            recent_unlocks,
            next_closest_badges,
        }
    }
}
