use sqlx::{types::Json, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewHistoryEntry, OutfitHistoryEntry, OutfitHistoryRow};

pub const HISTORY_LIMIT: i64 = 20;

pub async fn insert_entry(db: &SqlitePool, entry: &NewHistoryEntry<'_>) -> sqlx::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO outfit_history
            (id, user_id, occasion, weather_temp, weather_condition, outfit_items, ai_explanation, worn_date)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(entry.user_id)
    .bind(entry.occasion)
    .bind(entry.weather_temp)
    .bind(entry.weather_condition)
    .bind(Json(&entry.outfit_items))
    .bind(entry.ai_explanation)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;
    Ok(id)
}

/// The most recent [`HISTORY_LIMIT`] entries of a user, newest first.
pub async fn recent_for_user(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<Vec<OutfitHistoryEntry>> {
    let rows = sqlx::query_as::<_, OutfitHistoryRow>(
        r#"
        SELECT id, user_id, occasion, weather_temp, weather_condition, outfit_items,
               ai_explanation, worn_date
          FROM outfit_history
         WHERE user_id = ?
         ORDER BY worn_date DESC, rowid DESC
         LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(HISTORY_LIMIT)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[cfg(test)]
pub(crate) async fn count_for_user(db: &SqlitePool, user_id: Uuid) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM outfit_history WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}
