//! Repository port traits for badge storage.

use async_trait::async_trait;
use waymark_domain::{Badge, BadgeId, UserBadgeProgress, UserId};

use super::error::RepoError;

// =============================================================================
// Badge Catalog
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeCatalogRepo: Send + Sync {
    /// All badges, ordered by id.
    async fn list(&self) -> Result<Vec<Badge>, RepoError>;
    async fn get(&self, id: &BadgeId) -> Result<Option<Badge>, RepoError>;
    /// Fails with `ConstraintViolation` if the id is taken.
    async fn insert(&self, badge: &Badge) -> Result<(), RepoError>;
    /// Fails with `NotFound` if the id does not exist.
    async fn update(&self, badge: &Badge) -> Result<(), RepoError>;
    /// Returns false if nothing was deleted.
    async fn delete(&self, id: &BadgeId) -> Result<bool, RepoError>;
    async fn count(&self) -> Result<usize, RepoError>;
}

// =============================================================================
// Progress Store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeProgressRepo: Send + Sync {
    async fn get(
        &self,
        user_id: &UserId,
        badge_id: &BadgeId,
    ) -> Result<Option<UserBadgeProgress>, RepoError>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<UserBadgeProgress>, RepoError>;

    /// Store `progress` only if the stored row is still at `expected_version`
    /// (0 meaning no row exists yet). The stored version becomes
    /// `expected_version + 1`. Returns false when another writer got there first.
    async fn compare_and_swap(
        &self,
        progress: &UserBadgeProgress,
        expected_version: u64,
    ) -> Result<bool, RepoError>;

    /// Insert `progress` at version 1 unless a row already exists.
    /// Returns true if a row was created.
    async fn insert_if_absent(&self, progress: &UserBadgeProgress) -> Result<bool, RepoError>;
}
