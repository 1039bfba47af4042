use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use waymark_domain::common::{format_datetime, parse_datetime};
use waymark_domain::{Badge, BadgeCriteria, BadgeId, BadgeName};

use super::column_u32;
use crate::infrastructure::ports::{BadgeCatalogRepo, RepoError};

const SELECT_BADGE: &str = r#"
    SELECT id, name, description, icon, category, rarity, points,
           criteria_json, hidden, created_at, updated_at
    FROM badges
"#;

pub struct SqliteBadgeCatalogRepo {
    pool: SqlitePool,
}

impl SqliteBadgeCatalogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn text(row: &SqliteRow, column: &str) -> Result<String, RepoError> {
    row.try_get(column).map_err(RepoError::serialization)
}

fn row_to_badge(row: &SqliteRow) -> Result<Badge, RepoError> {
    let criteria: BadgeCriteria = serde_json::from_str(&text(row, "criteria_json")?)
        .map_err(RepoError::serialization)?;
    let hidden: bool = row.try_get("hidden").map_err(RepoError::serialization)?;

    Ok(Badge {
        id: BadgeId::new(text(row, "id")?).map_err(RepoError::serialization)?,
        name: BadgeName::new(text(row, "name")?).map_err(RepoError::serialization)?,
        description: text(row, "description")?,
        icon: text(row, "icon")?,
        category: text(row, "category")?
            .parse()
            .map_err(RepoError::serialization)?,
        rarity: text(row, "rarity")?
            .parse()
            .map_err(RepoError::serialization)?,
        points: column_u32(row, "points")?,
        criteria,
        hidden,
        created_at: parse_datetime(&text(row, "created_at")?).map_err(RepoError::serialization)?,
        updated_at: parse_datetime(&text(row, "updated_at")?).map_err(RepoError::serialization)?,
    })
}

#[async_trait]
impl BadgeCatalogRepo for SqliteBadgeCatalogRepo {
    async fn list(&self) -> Result<Vec<Badge>, RepoError> {
        let rows = sqlx::query(&format!("{SELECT_BADGE} ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("list_badges", e))?;

        rows.iter().map(row_to_badge).collect()
    }

    async fn get(&self, id: &BadgeId) -> Result<Option<Badge>, RepoError> {
        let row = sqlx::query(&format!("{SELECT_BADGE} WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("get_badge", e))?;

        row.as_ref().map(row_to_badge).transpose()
    }

    async fn insert(&self, badge: &Badge) -> Result<(), RepoError> {
        let criteria =
            serde_json::to_string(&badge.criteria).map_err(RepoError::serialization)?;

        let result = sqlx::query(
            r#"
            INSERT INTO badges (id, name, description, icon, category, rarity, points,
                                criteria_json, hidden, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(badge.id.as_str())
        .bind(badge.name.as_str())
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(badge.category.as_str())
        .bind(badge.rarity.as_str())
        .bind(badge.points)
        .bind(criteria)
        .bind(badge.hidden)
        .bind(format_datetime(&badge.created_at))
        .bind(format_datetime(&badge.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("insert_badge", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::constraint(format!(
                "badge {} already exists",
                badge.id
            )));
        }
        Ok(())
    }

    async fn update(&self, badge: &Badge) -> Result<(), RepoError> {
        let criteria =
            serde_json::to_string(&badge.criteria).map_err(RepoError::serialization)?;

        let result = sqlx::query(
            r#"
            UPDATE badges SET
                name = ?, description = ?, icon = ?, category = ?, rarity = ?,
                points = ?, criteria_json = ?, hidden = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(badge.name.as_str())
        .bind(&badge.description)
        .bind(&badge.icon)
        .bind(badge.category.as_str())
        .bind(badge.rarity.as_str())
        .bind(badge.points)
        .bind(criteria)
        .bind(badge.hidden)
        .bind(format_datetime(&badge.updated_at))
        .bind(badge.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("update_badge", e))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Badge", &badge.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &BadgeId) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM badges WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("delete_badge", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM badges")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepoError::database("count_badges", e))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
