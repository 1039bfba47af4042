//! Per-user badge progress
//!
//! One record per `(user_id, badge_id)`. Records are created lazily by the
//! first matching event and never deleted. Progress only moves forward and
//! an unlocked record never changes again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{BadgeId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadgeProgress {
    pub user_id: UserId,
    pub badge_id: BadgeId,
    pub progress: u32,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub progress_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Storage revision for compare-and-swap writes; 0 means not yet persisted
    #[serde(skip)]
    pub version: u64,
}

/// Outcome of a successful [`UserBadgeProgress::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub progress: u32,
    /// True only on the locked -> unlocked transition
    pub just_unlocked: bool,
}

impl UserBadgeProgress {
    /// The zero record returned for a pair that has no stored row.
    pub fn new(user_id: UserId, badge_id: BadgeId) -> Self {
        Self {
            user_id,
            badge_id,
            progress: 0,
            is_unlocked: false,
            unlocked_at: None,
            progress_updated_at: None,
            metadata: Map::new(),
            version: 0,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.version > 0
    }

    /// Advance progress by `delta`, clamped to `threshold`.
    ///
    /// Returns `None` when the record is already unlocked; the record is left
    /// untouched and nothing should be written. Otherwise merges `metadata`
    /// (last write wins per key), stamps `progress_updated_at`, and sets
    /// `unlocked_at` on the first crossing of `threshold`.
    pub fn advance(
        &mut self,
        delta: u32,
        threshold: u32,
        metadata: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Option<ProgressUpdate> {
        if self.is_unlocked {
            return None;
        }

        self.progress = self.progress.saturating_add(delta).min(threshold);
        self.progress_updated_at = Some(now);
        for (key, value) in metadata {
            self.metadata.insert(key.clone(), value.clone());
        }

        let just_unlocked = self.progress >= threshold;
        if just_unlocked {
            self.is_unlocked = true;
            self.unlocked_at = Some(now);
        }

        Some(ProgressUpdate {
            progress: self.progress,
            just_unlocked,
        })
    }

    /// Fraction of the threshold reached, as a `(progress, threshold)` pair
    /// comparable by cross-multiplication.
    pub fn ratio(&self, threshold: u32) -> (u64, u64) {
        (u64::from(self.progress), u64::from(threshold.max(1)))
    }
}
