//! Evaluate (catalog-wide row sync) use case.

use std::sync::Arc;

use waymark_domain::UserId;
use waymark_shared::EvaluateResponse;

use super::BadgeError;
use crate::repositories::{BadgeCatalog, BadgeProgress};

/// Ensure the user has a progress row for every badge in the catalog.
///
/// Missing rows are created at zero. Existing rows are left as they are and
/// no past events are replayed, so this never unlocks anything.
pub struct EvaluateBadges {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
}

impl EvaluateBadges {
    pub fn new(catalog: Arc<BadgeCatalog>, progress: Arc<BadgeProgress>) -> Self {
        Self { catalog, progress }
    }

    pub async fn execute(&self, user_id: &UserId) -> Result<EvaluateResponse, BadgeError> {
        let badges = self.catalog.list().await?;
        let created = self.progress.ensure_rows(user_id, &badges).await?;

        tracing::debug!(
            user_id = %user_id,
            created,
            total = badges.len(),
            "Synced badge progress rows"
        );

        Ok(EvaluateResponse {
            created,
            total: u32::try_from(badges.len()).unwrap_or(u32::MAX),
        })
    }
}
