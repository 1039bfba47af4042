//! Badge administration use case.

use std::sync::Arc;

use waymark_domain::{Badge, BadgeId};
use waymark_shared::{CreateBadgeRequest, UpdateBadgeRequest};

use super::BadgeError;
use crate::infrastructure::ports::ClockPort;
use crate::repositories::BadgeCatalog;

/// Create, update and delete catalog entries.
///
/// Changes apply from the next processed event; progress rows are never
/// rewritten when a badge changes.
pub struct ManageBadges {
    catalog: Arc<BadgeCatalog>,
    clock: Arc<dyn ClockPort>,
}

impl ManageBadges {
    pub fn new(catalog: Arc<BadgeCatalog>, clock: Arc<dyn ClockPort>) -> Self {
        Self { catalog, clock }
    }

    pub async fn create(&self, request: CreateBadgeRequest) -> Result<Badge, BadgeError> {
        let mut badge = Badge::new(
            request.id,
            request.name,
            request.category,
            request.rarity,
            request.criteria,
            self.clock.now(),
        )
        .with_description(request.description)
        .with_icon(request.icon)
        .with_points(request.points);
        badge.hidden = request.hidden;

        self.catalog.create(&badge).await?;
        tracing::info!(badge_id = %badge.id, "Badge created");
        Ok(badge)
    }

    /// Replace the supplied fields and bump `updated_at`. The id is immutable.
    pub async fn update(
        &self,
        id: &BadgeId,
        request: UpdateBadgeRequest,
    ) -> Result<Badge, BadgeError> {
        let mut badge = self
            .catalog
            .get(id)
            .await?
            .ok_or_else(|| BadgeError::NotFound(id.to_string()))?;

        if let Some(name) = request.name {
            badge.name = name;
        }
        if let Some(description) = request.description {
            badge.description = description;
        }
        if let Some(icon) = request.icon {
            badge.icon = icon;
        }
        if let Some(category) = request.category {
            badge.category = category;
        }
        if let Some(rarity) = request.rarity {
            badge.rarity = rarity;
        }
        if let Some(points) = request.points {
            badge.points = points;
        }
        if let Some(criteria) = request.criteria {
            badge.criteria = criteria;
        }
        if let Some(hidden) = request.hidden {
            badge.hidden = hidden;
        }
        badge.updated_at = self.clock.now();

        self.catalog.update(&badge).await?;
        tracing::info!(badge_id = %badge.id, "Badge updated");
        Ok(badge)
    }

    pub async fn delete(&self, id: &BadgeId) -> Result<(), BadgeError> {
        if !self.catalog.delete(id).await? {
            return Err(BadgeError::NotFound(id.to_string()));
        }
        tracing::info!(badge_id = %id, "Badge deleted");
        Ok(())
    }
}
