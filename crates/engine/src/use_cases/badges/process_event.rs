//! Event Processor: turns a trigger event into progress and unlocks.

use std::sync::Arc;

use futures_util::future::join_all;
use waymark_domain::{TriggerEvent, UnlockEvent};

use super::{BadgeError, UnlockNotifier};
use crate::infrastructure::ports::{ClockPort, RepoError};
use crate::repositories::{BadgeCatalog, BadgeProgress, ProgressError};

/// Process a trigger event use case.
///
/// Every catalog badge whose criteria match the event advances by one. Each
/// `(user, badge)` unlock is reported by exactly one call, however many
/// times the same event is delivered or how many deliveries race.
pub struct ProcessEvent {
    catalog: Arc<BadgeCatalog>,
    progress: Arc<BadgeProgress>,
    notifier: Arc<UnlockNotifier>,
    clock: Arc<dyn ClockPort>,
}

impl ProcessEvent {
    pub fn new(
        catalog: Arc<BadgeCatalog>,
        progress: Arc<BadgeProgress>,
        notifier: Arc<UnlockNotifier>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            catalog,
            progress,
            notifier,
            clock,
        }
    }

    pub async fn execute(&self, event: &TriggerEvent) -> Result<Vec<UnlockEvent>, BadgeError> {
        event.validate()?;

        let user_id = event.user_id();
        let badges = self.catalog.list().await?;
        let matching: Vec<_> = badges
            .iter()
            .filter(|badge| badge.criteria.matches(event))
            .collect();

        if matching.is_empty() {
            tracing::debug!(
                user_id = %user_id,
                kind = %event.kind(),
                "Event matches no badges"
            );
            return Ok(Vec::new());
        }

        let metadata = event.to_metadata();
        let outcomes = join_all(matching.iter().map(|badge| {
            let metadata = &metadata;
            async move {
                let applied = self.progress.apply_delta(user_id, badge, 1, metadata).await;
                (*badge, applied)
            }
        }))
        .await;

        let mut unlocks = Vec::new();
        let mut first_error = None;
        for (badge, outcome) in outcomes {
            match outcome {
                Ok(applied) if applied.just_unlocked => {
                    let timestamp = applied
                        .progress
                        .unlocked_at
                        .unwrap_or_else(|| self.clock.now());
                    unlocks.push(UnlockEvent::new(
                        user_id.clone(),
                        badge.clone(),
                        timestamp,
                        metadata.clone(),
                    ));
                }
                Ok(_) => {}
                Err(ProgressError::Repo(RepoError::NotFound { .. })) => {
                    tracing::debug!(
                        user_id = %user_id,
                        badge_id = %badge.id,
                        "Badge disappeared while processing event, skipping"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %user_id,
                        badge_id = %badge.id,
                        error = %e,
                        "Failed to apply badge progress"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        // Unlocks that did commit are durable, so they are announced even
        // when a sibling badge failed.
        for unlock in &unlocks {
            self.notifier.emit(unlock).await;
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(unlocks),
        }
    }
}
