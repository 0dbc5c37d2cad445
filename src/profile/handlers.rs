use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{ProfileResponse, ProfileUpdated, UserProfile},
    repo,
};
use crate::{
    auth::{AuthUser, User},
    error::{AppError, AppResult},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<UserProfile>, JsonRejection>,
) -> AppResult<Json<ProfileUpdated>> {
    let Json(payload) = payload?;
    let profile = payload.normalized();
    if matches!(profile.age, Some(age) if !(0..=150).contains(&age)) {
        return Err(AppError::Validation("Age must be between 0 and 150".into()));
    }

    let changes = repo::update_profile(&state.db, user_id, &profile).await?;
    info!(%user_id, changes, "profile updated");
    Ok(Json(ProfileUpdated {
        success: true,
        message: "Profile updated successfully",
        changes,
    }))
}
