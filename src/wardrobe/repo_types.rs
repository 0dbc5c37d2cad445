use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::category::Category;

#[derive(Debug, FromRow)]
pub struct WardrobeItemRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub color: String,
    pub gender: Option<String>,
    pub image_path: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_worn: Option<OffsetDateTime>,
    pub wear_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WardrobeItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: Category,
    pub color: String,
    pub gender: Option<String>,
    pub image_path: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_worn: Option<OffsetDateTime>,
    pub wear_count: i64,
}

impl From<WardrobeItemRow> for WardrobeItem {
    fn from(r: WardrobeItemRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            category: Category::parse(&r.category),
            color: r.color,
            gender: r.gender,
            image_path: r.image_path,
            description: r.description,
            created_at: r.created_at,
            last_worn: r.last_worn,
            wear_count: r.wear_count.max(0),
        }
    }
}

/// Fields of an item about to be inserted.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub user_id: Uuid,
    pub category: Category,
    pub color: String,
    pub gender: Option<String>,
    pub image_path: String,
    pub description: Option<String>,
}
