use serde_json::json;

use crate::infrastructure::ports::{BadgeCatalogRepo, BadgeProgressRepo, RepoError};
use crate::test_fixtures::{badge, badge_id, fixed_now, progress_row, user};

use super::{connect, SqliteBadgeCatalogRepo, SqliteBadgeProgressRepo};

async fn open(dir: &tempfile::TempDir) -> sqlx::SqlitePool {
    let db_path = dir.path().join("nested").join("badges.db");
    connect(&db_path.to_string_lossy()).await.expect("connect")
}

#[tokio::test]
async fn badge_round_trips_through_sqlite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = SqliteBadgeCatalogRepo::new(open(&dir).await);

    let mut original = badge("quest_42", "quest_completed", 1)
        .with_description("Finish the lighthouse quest")
        .with_icon("🗼")
        .hidden();
    original.criteria = original.criteria.clone().with_filter("questId", "q42");
    catalog.insert(&original).await.expect("insert");

    let loaded = catalog
        .get(&badge_id("quest_42"))
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(loaded, original);
}

#[tokio::test]
async fn catalog_lists_by_id_and_enforces_uniqueness() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = SqliteBadgeCatalogRepo::new(open(&dir).await);

    catalog.insert(&badge("zeta", "quest_completed", 1)).await.expect("insert");
    catalog.insert(&badge("alpha", "quest_completed", 1)).await.expect("insert");

    let err = catalog
        .insert(&badge("alpha", "quest_completed", 2))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));

    let ids: Vec<_> = catalog
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|b| b.id.to_string())
        .collect();
    assert_eq!(ids, vec!["alpha", "zeta"]);
    assert_eq!(catalog.count().await.expect("count"), 2);
}

#[tokio::test]
async fn catalog_update_and_delete() {
    let dir = tempfile::tempdir().expect("tempdir");
    let catalog = SqliteBadgeCatalogRepo::new(open(&dir).await);

    let mut b = badge("explorer", "waypoint_reached", 10);
    let err = catalog.update(&b).await.unwrap_err();
    assert!(err.is_not_found());

    catalog.insert(&b).await.expect("insert");
    b.points = 99;
    catalog.update(&b).await.expect("update");
    let loaded = catalog.get(&b.id).await.expect("get").expect("exists");
    assert_eq!(loaded.points, 99);

    assert!(catalog.delete(&b.id).await.expect("delete"));
    assert!(!catalog.delete(&b.id).await.expect("delete again"));
    assert!(catalog.get(&b.id).await.expect("get").is_none());
}

#[tokio::test]
async fn progress_compare_and_swap_follows_versions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteBadgeProgressRepo::new(open(&dir).await);

    let mut row = progress_row("u1", "explorer", 1);
    row.progress_updated_at = Some(fixed_now());
    row.metadata.insert("waypointId".into(), json!("w1"));

    assert!(!store.compare_and_swap(&row, 1).await.expect("cas"));
    assert!(store.compare_and_swap(&row, 0).await.expect("cas"));
    assert!(!store.compare_and_swap(&row, 0).await.expect("cas"));

    row.progress = 2;
    assert!(store.compare_and_swap(&row, 1).await.expect("cas"));
    row.progress = 5;
    assert!(!store.compare_and_swap(&row, 1).await.expect("stale cas"));

    let stored = store
        .get(&user("u1"), &badge_id("explorer"))
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(stored.progress, 2);
    assert_eq!(stored.version, 2);
    assert_eq!(stored.progress_updated_at, Some(fixed_now()));
    assert_eq!(stored.metadata.get("waypointId"), Some(&json!("w1")));
}

#[tokio::test]
async fn unlocked_row_persists_unlock_time() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteBadgeProgressRepo::new(open(&dir).await);

    let mut row = progress_row("u1", "first_quest", 1);
    row.is_unlocked = true;
    row.unlocked_at = Some(fixed_now());
    assert!(store.compare_and_swap(&row, 0).await.expect("cas"));

    let stored = store
        .get(&user("u1"), &badge_id("first_quest"))
        .await
        .expect("get")
        .expect("exists");
    assert!(stored.is_unlocked);
    assert_eq!(stored.unlocked_at, Some(fixed_now()));
}

#[tokio::test]
async fn insert_if_absent_and_list_for_user() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteBadgeProgressRepo::new(open(&dir).await);

    assert!(store
        .compare_and_swap(&progress_row("u1", "b", 3), 0)
        .await
        .expect("cas"));
    assert!(!store
        .insert_if_absent(&progress_row("u1", "b", 0))
        .await
        .expect("ensure"));
    assert!(store
        .insert_if_absent(&progress_row("u1", "a", 0))
        .await
        .expect("ensure"));
    assert!(store
        .insert_if_absent(&progress_row("u2", "a", 0))
        .await
        .expect("ensure"));

    let rows = store.list_for_user(&user("u1")).await.expect("list");
    let summary: Vec<_> = rows
        .iter()
        .map(|r| (r.badge_id.to_string(), r.progress, r.version))
        .collect();
    assert_eq!(
        summary,
        vec![("a".to_string(), 0, 1), ("b".to_string(), 3, 1)]
    );
}

#[tokio::test]
async fn data_survives_reconnect() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let pool = open(&dir).await;
        SqliteBadgeCatalogRepo::new(pool.clone())
            .insert(&badge("first_quest", "quest_completed", 1))
            .await
            .expect("insert");
        SqliteBadgeProgressRepo::new(pool.clone())
            .insert_if_absent(&progress_row("u1", "first_quest", 0))
            .await
            .expect("ensure");
        pool.close().await;
    }

    let pool = open(&dir).await;
    let catalog = SqliteBadgeCatalogRepo::new(pool.clone());
    let store = SqliteBadgeProgressRepo::new(pool);
    assert_eq!(catalog.count().await.expect("count"), 1);
    assert_eq!(store.list_for_user(&user("u1")).await.expect("list").len(), 1);
}
