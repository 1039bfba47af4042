//! In-memory badge storage.
//!
//! Used by tests and by `STORAGE_BACKEND=memory` for throwaway runs. The
//! progress map serialises same-key writes through DashMap's per-shard entry
//! lock, which gives the same compare-and-swap contract as the SQLite adapter.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::RwLock;
use waymark_domain::{Badge, BadgeId, UserBadgeProgress, UserId};

use crate::infrastructure::ports::{BadgeCatalogRepo, BadgeProgressRepo, RepoError};

pub struct InMemoryBadgeCatalog {
    badges: RwLock<BTreeMap<BadgeId, Badge>>,
}

impl InMemoryBadgeCatalog {
    pub fn new() -> Self {
        Self {
            badges: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn with_badges(badges: impl IntoIterator<Item = Badge>) -> Self {
        Self {
            badges: RwLock::new(badges.into_iter().map(|b| (b.id.clone(), b)).collect()),
        }
    }
}

impl Default for InMemoryBadgeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BadgeCatalogRepo for InMemoryBadgeCatalog {
    async fn list(&self) -> Result<Vec<Badge>, RepoError> {
        Ok(self.badges.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &BadgeId) -> Result<Option<Badge>, RepoError> {
        Ok(self.badges.read().await.get(id).cloned())
    }

    async fn insert(&self, badge: &Badge) -> Result<(), RepoError> {
        let mut badges = self.badges.write().await;
        if badges.contains_key(&badge.id) {
            return Err(RepoError::constraint(format!(
                "badge {} already exists",
                badge.id
            )));
        }
        badges.insert(badge.id.clone(), badge.clone());
        Ok(())
    }

    async fn update(&self, badge: &Badge) -> Result<(), RepoError> {
        let mut badges = self.badges.write().await;
        match badges.get_mut(&badge.id) {
            Some(existing) => {
                *existing = badge.clone();
                Ok(())
            }
            None => Err(RepoError::not_found("Badge", &badge.id)),
        }
    }

    async fn delete(&self, id: &BadgeId) -> Result<bool, RepoError> {
        Ok(self.badges.write().await.remove(id).is_some())
    }

    async fn count(&self) -> Result<usize, RepoError> {
        Ok(self.badges.read().await.len())
    }
}

pub struct InMemoryBadgeProgress {
    rows: DashMap<(UserId, BadgeId), UserBadgeProgress>,
}

impl InMemoryBadgeProgress {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }
}

impl Default for InMemoryBadgeProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BadgeProgressRepo for InMemoryBadgeProgress {
    async fn get(
        &self,
        user_id: &UserId,
        badge_id: &BadgeId,
    ) -> Result<Option<UserBadgeProgress>, RepoError> {
        Ok(self
            .rows
            .get(&(user_id.clone(), badge_id.clone()))
            .map(|row| row.value().clone()))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<UserBadgeProgress>, RepoError> {
        let mut rows: Vec<_> = self
            .rows
            .iter()
            .filter(|row| &row.key().0 == user_id)
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| a.badge_id.cmp(&b.badge_id));
        Ok(rows)
    }

    async fn compare_and_swap(
        &self,
        progress: &UserBadgeProgress,
        expected_version: u64,
    ) -> Result<bool, RepoError> {
        let key = (progress.user_id.clone(), progress.badge_id.clone());
        let mut next = progress.clone();
        next.version = expected_version + 1;

        match self.rows.entry(key) {
            Entry::Occupied(mut row) if row.get().version == expected_version => {
                row.insert(next);
                Ok(true)
            }
            Entry::Vacant(row) if expected_version == 0 => {
                row.insert(next);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_if_absent(&self, progress: &UserBadgeProgress) -> Result<bool, RepoError> {
        let key = (progress.user_id.clone(), progress.badge_id.clone());
        match self.rows.entry(key) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(row) => {
                let mut fresh = progress.clone();
                fresh.version = 1;
                row.insert(fresh);
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use waymark_domain::{BadgeCategory, BadgeCriteria, BadgeName, BadgeRarity};

    fn badge(id: &str) -> Badge {
        Badge::new(
            BadgeId::new(id).unwrap(),
            BadgeName::new(id).unwrap(),
            BadgeCategory::Explorer,
            BadgeRarity::Common,
            BadgeCriteria::new("waypoint_reached", 3),
            Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap(),
        )
    }

    fn row(user: &str, badge: &str) -> UserBadgeProgress {
        UserBadgeProgress::new(UserId::new(user).unwrap(), BadgeId::new(badge).unwrap())
    }

    #[tokio::test]
    async fn catalog_lists_in_id_order() {
        let catalog = InMemoryBadgeCatalog::with_badges([badge("zeta"), badge("alpha")]);
        let ids: Vec<_> = catalog
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id.to_string())
            .collect();
        assert_eq!(ids, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn catalog_insert_rejects_duplicate_id() {
        let catalog = InMemoryBadgeCatalog::new();
        catalog.insert(&badge("a")).await.unwrap();
        let err = catalog.insert(&badge("a")).await.unwrap_err();
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn catalog_update_missing_is_not_found() {
        let catalog = InMemoryBadgeCatalog::new();
        let err = catalog.update(&badge("ghost")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn cas_from_empty_requires_version_zero() {
        let store = InMemoryBadgeProgress::new();
        let p = row("u1", "a");

        assert!(!store.compare_and_swap(&p, 3).await.unwrap());
        assert!(store.compare_and_swap(&p, 0).await.unwrap());
        assert!(!store.compare_and_swap(&p, 0).await.unwrap());

        let stored = store.get(&p.user_id, &p.badge_id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn cas_rejects_stale_version() {
        let store = InMemoryBadgeProgress::new();
        let mut p = row("u1", "a");
        assert!(store.compare_and_swap(&p, 0).await.unwrap());

        p.progress = 2;
        assert!(store.compare_and_swap(&p, 1).await.unwrap());
        p.progress = 3;
        assert!(!store.compare_and_swap(&p, 1).await.unwrap());

        let stored = store.get(&p.user_id, &p.badge_id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 2);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_existing_rows() {
        let store = InMemoryBadgeProgress::new();
        let mut p = row("u1", "a");
        p.progress = 2;
        assert!(store.compare_and_swap(&p, 0).await.unwrap());

        assert!(!store.insert_if_absent(&row("u1", "a")).await.unwrap());
        assert!(store.insert_if_absent(&row("u1", "b")).await.unwrap());

        let rows = store.list_for_user(&UserId::new("u1").unwrap()).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].progress, 2);
        assert_eq!(rows[1].progress, 0);
    }

    #[tokio::test]
    async fn list_for_user_excludes_other_users() {
        let store = InMemoryBadgeProgress::new();
        store.insert_if_absent(&row("u1", "a")).await.unwrap();
        store.insert_if_absent(&row("u2", "a")).await.unwrap();

        let rows = store.list_for_user(&UserId::new("u2").unwrap()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id.as_str(), "u2");
    }
}
