use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewItem, WardrobeItem, WardrobeItemRow};

pub(crate) const ITEM_COLUMNS: &str = "id, user_id, category, color, gender, image_path, \
                                       description, created_at, last_worn, wear_count";

pub async fn insert_item(db: &SqlitePool, item: &NewItem) -> sqlx::Result<WardrobeItem> {
    let row = sqlx::query_as::<_, WardrobeItemRow>(&format!(
        r#"
        INSERT INTO wardrobe_items (id, user_id, category, color, gender, image_path, description, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {ITEM_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(item.user_id)
    .bind(item.category.label())
    .bind(&item.color)
    .bind(&item.gender)
    .bind(&item.image_path)
    .bind(&item.description)
    .bind(OffsetDateTime::now_utc())
    .fetch_one(db)
    .await?;
    Ok(row.into())
}

/// All items of a user, newest first.
pub async fn list_by_user(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<Vec<WardrobeItem>> {
    let rows = sqlx::query_as::<_, WardrobeItemRow>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
          FROM wardrobe_items
         WHERE user_id = ?
         ORDER BY created_at DESC, rowid DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find_owned(
    db: &SqlitePool,
    user_id: Uuid,
    item_id: Uuid,
) -> sqlx::Result<Option<WardrobeItem>> {
    let row = sqlx::query_as::<_, WardrobeItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM wardrobe_items WHERE id = ? AND user_id = ?"
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(Into::into))
}

pub async fn delete_owned(db: &SqlitePool, user_id: Uuid, item_id: Uuid) -> sqlx::Result<u64> {
    let res = sqlx::query("DELETE FROM wardrobe_items WHERE id = ? AND user_id = ?")
        .bind(item_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
pub(crate) fn new_item(user_id: Uuid, category: super::Category, path: &str) -> NewItem {
    NewItem {
        user_id,
        category,
        color: "Blue".into(),
        gender: Some("Unisex".into()),
        image_path: path.into(),
        description: Some("a thing".into()),
    }
}
