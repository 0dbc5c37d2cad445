use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::{info, instrument};

use super::repo;
use crate::{auth::AuthUser, error::AppResult, state::AppState, wardrobe::WardrobeItem};

pub fn analytics_routes() -> Router<AppState> {
    Router::new().route("/analytics", get(analytics))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_items: i64,
    pub underused_items: Vec<WardrobeItem>,
    pub most_worn_items: Vec<WardrobeItem>,
    pub usage_rate: f64,
}

/// Share of items among the most worn, as a percentage with one decimal.
pub fn usage_rate(most_worn: usize, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = most_worn as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

#[instrument(skip(state))]
pub async fn analytics(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Analytics>> {
    let total_items = repo::count_items(&state.db, user_id).await?;
    let underused_items = repo::underused(&state.db, user_id).await?;
    let most_worn_items = repo::most_worn(&state.db, user_id).await?;
    let usage_rate = usage_rate(most_worn_items.len(), total_items);

    info!(%user_id, total_items, underused = underused_items.len(), "analytics computed");
    Ok(Json(Analytics {
        total_items,
        underused_items,
        most_worn_items,
        usage_rate,
    }))
}
