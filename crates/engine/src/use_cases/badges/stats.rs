//! Stats Aggregator.

use std::sync::Arc;

use waymark_domain::{BadgeStats, UserId};

use super::BadgeError;
use crate::repositories::{BadgeCatalog, BadgeProgress};

/// Read-only summary of one user's badges. Hidden badges count toward the
/// totals like any other.
pub struct GetBadgeStats {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
}

impl GetBadgeStats {
    pub fn new(catalog: Arc<BadgeCatalog>, progress: Arc<BadgeProgress>) -> Self {
        Self { catalog, progress }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<BadgeStats, BadgeError> {
        let badges = self.catalog.list().await?;
        let rows = self.progress.list_for_user(user_id).await?;
        Ok(BadgeStats::compute(user_id, &badges, &rows))
    }
}
