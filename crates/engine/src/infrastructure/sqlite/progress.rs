use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use waymark_domain::common::{format_datetime, parse_optional_datetime};
use waymark_domain::{BadgeId, UserBadgeProgress, UserId};

use super::column_u32;
use crate::infrastructure::ports::{BadgeProgressRepo, RepoError};

const SELECT_PROGRESS: &str = r#"
    SELECT user_id, badge_id, progress, is_unlocked, unlocked_at,
           metadata_json, progress_updated_at, version
    FROM user_badge_progress
"#;

/// Conditional writes give each `(user_id, badge_id)` row compare-and-swap
/// semantics on its `version` column.
pub struct SqliteBadgeProgressRepo {
    pool: SqlitePool,
}

impl SqliteBadgeProgressRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_i64(version: u64) -> Result<i64, RepoError> {
    i64::try_from(version).map_err(|_| RepoError::serialization("version out of range"))
}

fn row_to_progress(row: &SqliteRow) -> Result<UserBadgeProgress, RepoError> {
    let user_id: String = row.try_get("user_id").map_err(RepoError::serialization)?;
    let badge_id: String = row.try_get("badge_id").map_err(RepoError::serialization)?;
    let unlocked_at: Option<String> = row
        .try_get("unlocked_at")
        .map_err(RepoError::serialization)?;
    let updated_at: Option<String> = row
        .try_get("progress_updated_at")
        .map_err(RepoError::serialization)?;
    let metadata_json: String = row
        .try_get("metadata_json")
        .map_err(RepoError::serialization)?;
    let metadata: Map<String, Value> =
        serde_json::from_str(&metadata_json).map_err(RepoError::serialization)?;
    let version: i64 = row.try_get("version").map_err(RepoError::serialization)?;

    Ok(UserBadgeProgress {
        user_id: UserId::new(user_id).map_err(RepoError::serialization)?,
        badge_id: BadgeId::new(badge_id).map_err(RepoError::serialization)?,
        progress: column_u32(row, "progress")?,
        is_unlocked: row
            .try_get("is_unlocked")
            .map_err(RepoError::serialization)?,
        unlocked_at: parse_optional_datetime(unlocked_at.as_deref()),
        progress_updated_at: parse_optional_datetime(updated_at.as_deref()),
        metadata,
        version: u64::try_from(version)
            .map_err(|_| RepoError::serialization(format!("negative version: {version}")))?,
    })
}

impl SqliteBadgeProgressRepo {
    async fn insert_row(
        &self,
        progress: &UserBadgeProgress,
        operation: &'static str,
    ) -> Result<bool, RepoError> {
        let metadata =
            serde_json::to_string(&progress.metadata).map_err(RepoError::serialization)?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_badge_progress (user_id, badge_id, progress, is_unlocked,
                                             unlocked_at, metadata_json, progress_updated_at, version)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT(user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(progress.user_id.as_str())
        .bind(progress.badge_id.as_str())
        .bind(progress.progress)
        .bind(progress.is_unlocked)
        .bind(progress.unlocked_at.as_ref().map(format_datetime))
        .bind(metadata)
        .bind(progress.progress_updated_at.as_ref().map(format_datetime))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database(operation, e))?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl BadgeProgressRepo for SqliteBadgeProgressRepo {
    async fn get(
        &self,
        user_id: &UserId,
        badge_id: &BadgeId,
    ) -> Result<Option<UserBadgeProgress>, RepoError> {
        let row = sqlx::query(&format!(
            "{SELECT_PROGRESS} WHERE user_id = ? AND badge_id = ?"
        ))
        .bind(user_id.as_str())
        .bind(badge_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::database("get_progress", e))?;

        row.as_ref().map(row_to_progress).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<UserBadgeProgress>, RepoError> {
        let rows = sqlx::query(&format!(
            "{SELECT_PROGRESS} WHERE user_id = ? ORDER BY badge_id"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("list_progress", e))?;

        rows.iter().map(row_to_progress).collect()
    }

    async fn compare_and_swap(
        &self,
        progress: &UserBadgeProgress,
        expected_version: u64,
    ) -> Result<bool, RepoError> {
        if expected_version == 0 {
            return self.insert_row(progress, "create_progress").await;
        }

        let metadata =
            serde_json::to_string(&progress.metadata).map_err(RepoError::serialization)?;

        let result = sqlx::query(
            r#"
            UPDATE user_badge_progress SET
                progress = ?,
                is_unlocked = ?,
                unlocked_at = ?,
                metadata_json = ?,
                progress_updated_at = ?,
                version = version + 1
            WHERE user_id = ? AND badge_id = ? AND version = ?
            "#,
        )
        .bind(progress.progress)
        .bind(progress.is_unlocked)
        .bind(progress.unlocked_at.as_ref().map(format_datetime))
        .bind(metadata)
        .bind(progress.progress_updated_at.as_ref().map(format_datetime))
        .bind(progress.user_id.as_str())
        .bind(progress.badge_id.as_str())
        .bind(to_i64(expected_version)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("update_progress", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn insert_if_absent(&self, progress: &UserBadgeProgress) -> Result<bool, RepoError> {
        self.insert_row(progress, "ensure_progress").await
    }
}
