use sqlx::SqlitePool;
use uuid::Uuid;

use super::dto::UserProfile;

/// Replace every profile attribute of `user_id`; returns rows changed.
pub async fn update_profile(db: &SqlitePool, user_id: Uuid, p: &UserProfile) -> sqlx::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE users
           SET gender = ?, age = ?, nationality = ?, current_location = ?,
               marital_status = ?, occupation = ?
         WHERE id = ?
        "#,
    )
    .bind(&p.gender)
    .bind(p.age)
    .bind(&p.nationality)
    .bind(&p.current_location)
    .bind(&p.marital_status)
    .bind(&p.occupation)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(res.rows_affected())
}
