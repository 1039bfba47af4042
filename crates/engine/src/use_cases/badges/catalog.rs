//! Catalog queries, with hidden badges filtered per viewer.

use std::collections::HashSet;
use std::sync::Arc;

use waymark_domain::{join_progress, Badge, BadgeId, BadgeWithProgress, UserBadgeProgress, UserId};

use super::BadgeError;
use crate::repositories::{BadgeCatalog, BadgeProgress};

/// List badges use case.
///
/// Anonymous viewers see every non-hidden badge. Signed-in viewers also see
/// the hidden badges they have unlocked.
pub struct ListBadges {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
}

impl ListBadges {
    pub fn new(catalog: Arc<BadgeCatalog>, progress: Arc<BadgeProgress>) -> Self {
        Self { catalog, progress }
    }

    pub async fn execute(&self, viewer: Option<&UserId>) -> Result<Vec<Badge>, BadgeError> {
        let badges = self.catalog.list_for_display().await?;
        let unlocked = match viewer {
            Some(user_id) => unlocked_ids(&self.progress.list_for_user(user_id).await?),
            None => HashSet::new(),
        };

        Ok(badges
            .into_iter()
            .filter(|badge| !badge.hidden || unlocked.contains(&badge.id))
            .collect())
    }
}

/// A single badge as seen by one viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeDetail {
    Anonymous(Badge),
    WithProgress(BadgeWithProgress),
}

/// Get badge use case.
pub struct GetBadge {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
}

impl GetBadge {
    pub fn new(catalog: Arc<BadgeCatalog>, progress: Arc<BadgeProgress>) -> Self {
        Self { catalog, progress }
    }

    /// Hidden badges look absent to anyone who has not unlocked them.
    pub async fn execute(
        &self,
        id: &BadgeId,
        viewer: Option<&UserId>,
    ) -> Result<BadgeDetail, BadgeError> {
        let badge = self
            .catalog
            .get(id)
            .await?
            .ok_or_else(|| BadgeError::NotFound(id.to_string()))?;

        let Some(user_id) = viewer else {
            if badge.hidden {
                return Err(BadgeError::NotFound(id.to_string()));
            }
            return Ok(BadgeDetail::Anonymous(badge));
        };

        let user_progress = self.progress.get_progress(user_id, id).await?;
        if badge.hidden && !user_progress.is_unlocked {
            return Err(BadgeError::NotFound(id.to_string()));
        }
        Ok(BadgeDetail::WithProgress(BadgeWithProgress {
            badge,
            user_progress,
        }))
    }
}

/// List the caller's badges with progress.
pub struct ListUserBadges {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
}

impl ListUserBadges {
    pub fn new(catalog: Arc<BadgeCatalog>, progress: Arc<BadgeProgress>) -> Self {
        Self { catalog, progress }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<Vec<BadgeWithProgress>, BadgeError> {
        let badges = self.catalog.list_for_display().await?;
        let rows = self.progress.list_for_user(user_id).await?;

        Ok(join_progress(user_id, &badges, &rows)
            .into_iter()
            .filter(|entry| !entry.badge.hidden || entry.is_unlocked())
            .collect())
    }
}

fn unlocked_ids(rows: &[UserBadgeProgress]) -> HashSet<BadgeId> {
    rows.iter()
        .filter(|row| row.is_unlocked)
        .map(|row| row.badge_id.clone())
        .collect()
}
