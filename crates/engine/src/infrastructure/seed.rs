//! Default badge catalog.
//!
//! Written into an empty catalog at startup when `SEED_DEFAULT_BADGES` is on.
//! Existing catalogs are never touched.

use chrono::{DateTime, Utc};
use waymark_domain::{
    Badge, BadgeCategory, BadgeCriteria, BadgeId, BadgeName, BadgeRarity, DomainError,
};

use crate::infrastructure::ports::{BadgeCatalogRepo, RepoError};

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    category: BadgeCategory,
    rarity: BadgeRarity,
    points: u32,
    event_type: &'static str,
    threshold: u32,
    hidden: bool,
}

const DEFAULT_BADGES: &[Seed] = &[
    Seed {
        id: "first_quest",
        name: "First Quest",
        description: "Complete your first quest",
        icon: "🏆",
        category: BadgeCategory::QuestCompletion,
        rarity: BadgeRarity::Common,
        points: 10,
        event_type: "quest_completed",
        threshold: 1,
        hidden: false,
    },
    Seed {
        id: "explorer_10_waypoints",
        name: "Explorer",
        description: "Visit 10 waypoints",
        icon: "🗺️",
        category: BadgeCategory::Explorer,
        rarity: BadgeRarity::Uncommon,
        points: 25,
        event_type: "waypoint_reached",
        threshold: 10,
        hidden: false,
    },
    Seed {
        id: "social_butterfly",
        name: "Social Butterfly",
        description: "Add 5 friends",
        icon: "🦋",
        category: BadgeCategory::Social,
        rarity: BadgeRarity::Rare,
        points: 50,
        event_type: "friend_added",
        threshold: 5,
        hidden: false,
    },
    Seed {
        id: "quest_creator",
        name: "Quest Creator",
        description: "Publish a quest of your own",
        icon: "🧭",
        category: BadgeCategory::Special,
        rarity: BadgeRarity::Uncommon,
        points: 20,
        event_type: "quest_created",
        threshold: 1,
        hidden: false,
    },
    Seed {
        id: "streak_7_days",
        name: "Week Warrior",
        description: "Log in seven days in a row",
        icon: "🔥",
        category: BadgeCategory::Streak,
        rarity: BadgeRarity::Epic,
        points: 75,
        event_type: "login_streak",
        threshold: 7,
        hidden: true,
    },
];

/// Build the default badges with `created_at`/`updated_at` set to `now`.
pub fn default_badges(now: DateTime<Utc>) -> Result<Vec<Badge>, DomainError> {
    DEFAULT_BADGES
        .iter()
        .map(|seed| {
            let mut badge = Badge::new(
                BadgeId::new(seed.id)?,
                BadgeName::new(seed.name)?,
                seed.category,
                seed.rarity,
                BadgeCriteria::new(seed.event_type, seed.threshold),
                now,
            )
            .with_description(seed.description)
            .with_icon(seed.icon)
            .with_points(seed.points);
            if seed.hidden {
                badge = badge.hidden();
            }
            badge.validate()?;
            Ok(badge)
        })
        .collect()
}

/// Insert the default badges if the catalog is empty. Returns how many were written.
pub async fn seed_if_empty(
    catalog: &dyn BadgeCatalogRepo,
    now: DateTime<Utc>,
) -> Result<usize, RepoError> {
    if catalog.count().await? > 0 {
        return Ok(0);
    }

    let badges = default_badges(now).map_err(RepoError::constraint)?;
    for badge in &badges {
        catalog.insert(badge).await?;
    }
    tracing::info!(count = badges.len(), "Seeded default badge catalog");
    Ok(badges.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryBadgeCatalog;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn default_badges_are_valid_and_unique() {
        let badges = default_badges(now()).unwrap();
        assert_eq!(badges.len(), DEFAULT_BADGES.len());

        let mut ids: Vec<_> = badges.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), badges.len());
    }

    #[tokio::test]
    async fn seeds_empty_catalog_once() {
        let catalog = InMemoryBadgeCatalog::new();
        assert_eq!(seed_if_empty(&catalog, now()).await.unwrap(), DEFAULT_BADGES.len());
        assert_eq!(seed_if_empty(&catalog, now()).await.unwrap(), 0);
        assert_eq!(catalog.count().await.unwrap(), DEFAULT_BADGES.len());
    }
}
