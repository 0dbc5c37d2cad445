use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct OutfitHistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub occasion: String,
    pub weather_temp: Option<f64>,
    pub weather_condition: Option<String>,
    pub outfit_items: String,
    pub ai_explanation: Option<String>,
    pub worn_date: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutfitHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub occasion: String,
    pub weather_temp: Option<f64>,
    pub weather_condition: Option<String>,
    pub outfit_items: Vec<Uuid>,
    pub ai_explanation: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub worn_date: OffsetDateTime,
}

impl From<OutfitHistoryRow> for OutfitHistoryEntry {
    fn from(r: OutfitHistoryRow) -> Self {
        let outfit_items = serde_json::from_str(&r.outfit_items).unwrap_or_else(|e| {
            warn!(entry_id = %r.id, error = %e, "unreadable outfit item list");
            Vec::new()
        });
        Self {
            id: r.id,
            user_id: r.user_id,
            occasion: r.occasion,
            weather_temp: r.weather_temp,
            weather_condition: r.weather_condition,
            outfit_items,
            ai_explanation: r.ai_explanation,
            worn_date: r.worn_date,
        }
    }
}

pub struct NewHistoryEntry<'a> {
    pub user_id: Uuid,
    pub occasion: &'a str,
    pub weather_temp: f64,
    pub weather_condition: &'a str,
    pub outfit_items: Vec<Uuid>,
    pub ai_explanation: &'a str,
}
