use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{RecommendRequest, RecommendResponse},
    repo,
    repo_types::OutfitHistoryEntry,
    services::recommend_outfit,
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn outfit_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(recommend))
        .route("/outfit-history", get(history))
}

#[instrument(skip(state, payload))]
pub async fn recommend(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(payload) = payload?;
    let occasion = payload
        .occasion
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .ok_or_else(|| AppError::Validation("Occasion is required".into()))?;
    let weather = payload
        .weather
        .ok_or_else(|| AppError::Validation("Weather is required".into()))?;

    Ok(Json(recommend_outfit(&state, user_id, occasion, weather).await?))
}

#[instrument(skip(state))]
pub async fn history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<OutfitHistoryEntry>>> {
    Ok(Json(repo::recent_for_user(&state.db, user_id).await?))
}
