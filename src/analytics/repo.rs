use sqlx::SqlitePool;
use uuid::Uuid;

use crate::wardrobe::{
    repo::ITEM_COLUMNS,
    repo_types::{WardrobeItem, WardrobeItemRow},
};

/// Items not worn for more than this many days count as underused.
pub const UNDERUSED_AFTER_DAYS: i64 = 30;
pub const MOST_WORN_LIMIT: i64 = 5;

pub async fn count_items(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM wardrobe_items WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}

/// Never worn, or last worn over [`UNDERUSED_AFTER_DAYS`] ago; least worn first.
pub async fn underused(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<Vec<WardrobeItem>> {
    let rows = sqlx::query_as::<_, WardrobeItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM wardrobe_items
         WHERE user_id = ?
           AND (last_worn IS NULL OR julianday('now') - julianday(last_worn) > ?)
         ORDER BY wear_count ASC, created_at DESC, rowid DESC
        "#
    ))
    .bind(user_id)
    .bind(UNDERUSED_AFTER_DAYS)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn most_worn(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<Vec<WardrobeItem>> {
    let rows = sqlx::query_as::<_, WardrobeItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM wardrobe_items
         WHERE user_id = ? AND wear_count > 0
         ORDER BY wear_count DESC
         LIMIT ?
        "#
    ))
    .bind(user_id)
    .bind(MOST_WORN_LIMIT)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}
