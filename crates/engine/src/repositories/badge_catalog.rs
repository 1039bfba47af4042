//! Badge Catalog operations.
//!
//! Read-mostly access to badge definitions. Mutations are admin-only and
//! validate the badge before it reaches storage.

use std::sync::Arc;

use waymark_domain::{sort_by_rarity_desc, Badge, BadgeId, DomainError};

use crate::infrastructure::ports::{BadgeCatalogRepo, RepoError};

pub struct BadgeCatalog {
    repo: Arc<dyn BadgeCatalogRepo>,
}

impl BadgeCatalog {
    pub fn new(repo: Arc<dyn BadgeCatalogRepo>) -> Self {
        Self { repo }
    }

    /// Every badge, hidden ones included, ordered by id.
    pub async fn list(&self) -> Result<Vec<Badge>, CatalogError> {
        Ok(self.repo.list().await?)
    }

    /// Every badge ordered for display: rarest first.
    pub async fn list_for_display(&self) -> Result<Vec<Badge>, CatalogError> {
        let mut badges = self.repo.list().await?;
        sort_by_rarity_desc(&mut badges);
        Ok(badges)
    }

    pub async fn get(&self, id: &BadgeId) -> Result<Option<Badge>, CatalogError> {
        Ok(self.repo.get(id).await?)
    }

    pub async fn create(&self, badge: &Badge) -> Result<(), CatalogError> {
        badge.validate()?;
        self.repo.insert(badge).await?;
        Ok(())
    }

    pub async fn update(&self, badge: &Badge) -> Result<(), CatalogError> {
        badge.validate()?;
        self.repo.update(badge).await?;
        Ok(())
    }

    /// Returns false when no badge had that id.
    pub async fn delete(&self, id: &BadgeId) -> Result<bool, CatalogError> {
        Ok(self.repo.delete(id).await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid badge: {0}")]
    Invalid(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
