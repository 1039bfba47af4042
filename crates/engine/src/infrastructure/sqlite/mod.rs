//! SQLite-backed badge storage.
//!
//! One pool is shared by the catalog and progress adapters. The schema is
//! created on connect; there are no migrations yet.

mod catalog;
mod progress;

#[cfg(test)]
mod integration_tests;

use std::path::Path;

use sqlx::SqlitePool;

use crate::infrastructure::ports::RepoError;

pub use catalog::SqliteBadgeCatalogRepo;
pub use progress::SqliteBadgeProgressRepo;

/// Open (creating if needed) the database at `db_path` and ensure the schema.
pub async fn connect(db_path: &str) -> Result<SqlitePool, RepoError> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RepoError::database("connect", e))?;
        }
    }

    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await
        .map_err(|e| RepoError::database("connect", e))?;

    ensure_schema(&pool).await?;
    Ok(pool)
}

async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepoError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS badges (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            icon TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            rarity TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 0,
            criteria_json TEXT NOT NULL,
            hidden INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("schema", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS user_badge_progress (
            user_id TEXT NOT NULL,
            badge_id TEXT NOT NULL,
            progress INTEGER NOT NULL DEFAULT 0,
            is_unlocked INTEGER NOT NULL DEFAULT 0,
            unlocked_at TEXT,
            metadata_json TEXT NOT NULL DEFAULT '{}',
            progress_updated_at TEXT,
            version INTEGER NOT NULL,
            PRIMARY KEY (user_id, badge_id)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| RepoError::database("schema", e))?;

    Ok(())
}

/// Read an INTEGER column that must fit in a `u32`.
fn column_u32(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<u32, RepoError> {
    use sqlx::Row;

    let value: i64 = row.try_get(column).map_err(RepoError::serialization)?;
    u32::try_from(value)
        .map_err(|_| RepoError::serialization(format!("{column} out of range: {value}")))
}
