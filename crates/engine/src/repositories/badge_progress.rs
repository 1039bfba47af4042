//! Progress Store.
//!
//! The only place progress rows are mutated. `apply_delta` reads the current
//! row, advances it in memory and writes it back with a compare-and-swap on
//! the row version, retrying when a concurrent writer wins the race. Because
//! only the writer whose swap succeeds reports `just_unlocked`, an unlock is
//! observed exactly once per `(user, badge)`.

use std::sync::Arc;

use serde_json::{Map, Value};
use waymark_domain::{Badge, BadgeId, UserBadgeProgress, UserId};

use crate::infrastructure::ports::{BadgeProgressRepo, ClockPort, RepoError};

/// Default compare-and-swap attempts per `apply_delta`
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Result of [`BadgeProgress::apply_delta`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDelta {
    pub progress: UserBadgeProgress,
    /// True only for the call that moved the row from locked to unlocked
    pub just_unlocked: bool,
}

pub struct BadgeProgress {
    repo: Arc<dyn BadgeProgressRepo>,
    clock: Arc<dyn ClockPort>,
    max_attempts: u32,
}

impl BadgeProgress {
    pub fn new(repo: Arc<dyn BadgeProgressRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            repo,
            clock,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Current progress, or an unpersisted zero record if the user has none.
    pub async fn get_progress(
        &self,
        user_id: &UserId,
        badge_id: &BadgeId,
    ) -> Result<UserBadgeProgress, ProgressError> {
        Ok(self
            .repo
            .get(user_id, badge_id)
            .await?
            .unwrap_or_else(|| UserBadgeProgress::new(user_id.clone(), badge_id.clone())))
    }

    /// All stored rows for a user, ordered by badge id.
    pub async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserBadgeProgress>, ProgressError> {
        Ok(self.repo.list_for_user(user_id).await?)
    }

    /// Advance `(user_id, badge)` by `delta`, clamped to the badge threshold.
    ///
    /// Already-unlocked rows are returned untouched with `just_unlocked = false`.
    pub async fn apply_delta(
        &self,
        user_id: &UserId,
        badge: &Badge,
        delta: u32,
        metadata: &Map<String, Value>,
    ) -> Result<AppliedDelta, ProgressError> {
        for attempt in 1..=self.max_attempts {
            let current = self.get_progress(user_id, &badge.id).await?;
            let expected_version = current.version;

            let mut next = current.clone();
            let Some(update) = next.advance(delta, badge.threshold(), metadata, self.clock.now())
            else {
                return Ok(AppliedDelta {
                    progress: current,
                    just_unlocked: false,
                });
            };

            if self.repo.compare_and_swap(&next, expected_version).await? {
                next.version = expected_version + 1;
                if update.just_unlocked {
                    tracing::info!(
                        user_id = %user_id,
                        badge_id = %badge.id,
                        "Badge unlocked"
                    );
                }
                return Ok(AppliedDelta {
                    progress: next,
                    just_unlocked: update.just_unlocked,
                });
            }

            tracing::debug!(
                user_id = %user_id,
                badge_id = %badge.id,
                attempt,
                "Progress write lost a concurrent update, retrying"
            );
        }

        tracing::warn!(
            user_id = %user_id,
            badge_id = %badge.id,
            attempts = self.max_attempts,
            "Giving up on progress update after repeated conflicts"
        );
        Err(ProgressError::ConcurrencyConflict {
            user_id: user_id.clone(),
            badge_id: badge.id.clone(),
            attempts: self.max_attempts,
        })
    }

    /// Create a zero row for every badge the user has no row for.
    /// Returns the number of rows created.
    pub async fn ensure_rows(
        &self,
        user_id: &UserId,
        badges: &[Badge],
    ) -> Result<u32, ProgressError> {
        let mut created = 0;
        for badge in badges {
            let zero = UserBadgeProgress::new(user_id.clone(), badge.id.clone());
            if self.repo.insert_if_absent(&zero).await? {
                created += 1;
            }
        }
        Ok(created)
    }
}

/// Errors that can occur during progress operations.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Gave up updating {badge_id} for {user_id} after {attempts} conflicting attempts")]
    ConcurrencyConflict {
        user_id: UserId,
        badge_id: BadgeId,
        attempts: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::memory::InMemoryBadgeProgress;
    use crate::infrastructure::ports::MockBadgeProgressRepo;
    use crate::test_fixtures::{badge, fixed_now, progress_row, user};
    use proptest::prelude::*;
    use serde_json::json;

    fn store(repo: Arc<dyn BadgeProgressRepo>) -> BadgeProgress {
        BadgeProgress::new(repo, Arc::new(FixedClock(fixed_now())))
    }

    #[tokio::test]
    async fn get_progress_defaults_to_unpersisted_zero() {
        let progress = store(Arc::new(InMemoryBadgeProgress::new()));
        let row = progress
            .get_progress(&user("u1"), &BadgeId::new("first_quest").unwrap())
            .await
            .unwrap();
        assert_eq!(row.progress, 0);
        assert!(!row.is_unlocked);
        assert!(!row.is_persisted());
    }

    #[tokio::test]
    async fn first_matching_event_unlocks_threshold_one_badge() {
        let progress = store(Arc::new(InMemoryBadgeProgress::new()));
        let first_quest = badge("first_quest", "quest_completed", 1);

        let applied = progress
            .apply_delta(&user("u1"), &first_quest, 1, &Map::new())
            .await
            .unwrap();

        assert!(applied.just_unlocked);
        assert_eq!(applied.progress.progress, 1);
        assert_eq!(applied.progress.unlocked_at, Some(fixed_now()));
        assert_eq!(applied.progress.version, 1);
    }

    #[tokio::test]
    async fn unlocked_row_is_left_alone() {
        let repo = Arc::new(InMemoryBadgeProgress::new());
        let progress = store(repo.clone());
        let first_quest = badge("first_quest", "quest_completed", 1);
        progress
            .apply_delta(&user("u1"), &first_quest, 1, &Map::new())
            .await
            .unwrap();

        let mut metadata = Map::new();
        metadata.insert("questId".into(), json!("q2"));
        let again = progress
            .apply_delta(&user("u1"), &first_quest, 1, &metadata)
            .await
            .unwrap();

        assert!(!again.just_unlocked);
        assert_eq!(again.progress.version, 1);
        assert!(again.progress.metadata.get("questId").is_none());
    }

    #[tokio::test]
    async fn retries_after_losing_a_race() {
        let mut repo = MockBadgeProgressRepo::new();
        let mut reads = 0;
        repo.expect_get().times(2).returning(move |_, _| {
            reads += 1;
            let mut row = progress_row("u1", "explorer", 8 + reads);
            row.version = u64::from(reads);
            Ok(Some(row))
        });
        repo.expect_compare_and_swap()
            .times(2)
            .returning(|_, expected| Ok(expected == 2));

        let explorer = badge("explorer", "waypoint_reached", 10);
        let applied = store(Arc::new(repo))
            .apply_delta(&user("u1"), &explorer, 1, &Map::new())
            .await
            .unwrap();

        assert_eq!(applied.progress.progress, 10);
        assert!(applied.just_unlocked);
        assert_eq!(applied.progress.version, 3);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_as_conflict() {
        let mut repo = MockBadgeProgressRepo::new();
        repo.expect_get().times(3).returning(|_, _| Ok(None));
        repo.expect_compare_and_swap()
            .times(3)
            .returning(|_, _| Ok(false));

        let explorer = badge("explorer", "waypoint_reached", 10);
        let err = store(Arc::new(repo))
            .apply_delta(&user("u1"), &explorer, 1, &Map::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProgressError::ConcurrencyConflict { attempts: 3, .. }
        ));
    }

    #[tokio::test]
    async fn storage_errors_propagate_without_retry() {
        let mut repo = MockBadgeProgressRepo::new();
        repo.expect_get()
            .times(1)
            .returning(|_, _| Err(RepoError::database("get_progress", "disk I/O error")));
        repo.expect_compare_and_swap().never();

        let explorer = badge("explorer", "waypoint_reached", 10);
        let err = store(Arc::new(repo))
            .apply_delta(&user("u1"), &explorer, 1, &Map::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ProgressError::Repo(RepoError::Database { .. })));
    }

    #[tokio::test]
    async fn ensure_rows_counts_only_new_rows() {
        let repo = Arc::new(InMemoryBadgeProgress::new());
        let progress = store(repo.clone());
        let badges = vec![
            badge("a", "quest_completed", 1),
            badge("b", "quest_completed", 1),
        ];
        progress
            .apply_delta(&user("u1"), &badges[0], 1, &Map::new())
            .await
            .unwrap();

        assert_eq!(progress.ensure_rows(&user("u1"), &badges).await.unwrap(), 1);
        assert_eq!(progress.ensure_rows(&user("u1"), &badges).await.unwrap(), 0);

        let rows = progress.list_for_user(&user("u1")).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_unlocked);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deltas_unlock_exactly_once() {
        let progress = Arc::new(
            store(Arc::new(InMemoryBadgeProgress::new())).with_max_attempts(64),
        );
        let explorer = Arc::new(badge("explorer", "waypoint_reached", 10));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let progress = progress.clone();
                let explorer = explorer.clone();
                tokio::spawn(async move {
                    progress
                        .apply_delta(&user("u1"), &explorer, 1, &Map::new())
                        .await
                })
            })
            .collect();

        let mut unlocks = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap().just_unlocked {
                unlocks += 1;
            }
        }

        assert_eq!(unlocks, 1);
        let row = progress
            .get_progress(&user("u1"), &explorer.id)
            .await
            .unwrap();
        assert_eq!(row.progress, 10);
        assert!(row.is_unlocked);
    }

    proptest! {
        #[test]
        fn progress_is_min_of_events_and_threshold(threshold in 1u32..20, events in 0usize..40) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            runtime.block_on(async {
                let progress = store(Arc::new(InMemoryBadgeProgress::new()));
                let b = badge("b", "quest_completed", threshold);
                let mut last = 0;
                let mut unlocks = 0;

                for _ in 0..events {
                    let applied = progress
                        .apply_delta(&user("u1"), &b, 1, &Map::new())
                        .await
                        .unwrap();
                    prop_assert!(applied.progress.progress >= last);
                    last = applied.progress.progress;
                    if applied.just_unlocked {
                        unlocks += 1;
                    }
                }

                let expected = u32::try_from(events).unwrap().min(threshold);
                prop_assert_eq!(last, expected);
                prop_assert_eq!(unlocks, u32::from(expected == threshold));
                Ok(())
            })?;
        }
    }
}
