use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{Recommendation, RecommendResponse, WeatherInput},
    recommend::{build_prompt, eligible, resolve_selection},
    repo,
    repo_types::NewHistoryEntry,
};
use crate::{
    ai::parser::{parse_or_default, Extracted},
    auth::User,
    error::{AppError, AppResult},
    profile::UserProfile,
    state::AppState,
    wardrobe,
};

/// Ask the stylist for an outfit from the user's wardrobe and log it to history.
#[instrument(skip(st, weather))]
pub async fn recommend_outfit(
    st: &AppState,
    user_id: Uuid,
    occasion: String,
    weather: WeatherInput,
) -> AppResult<RecommendResponse> {
    let user = User::find_by_id(&st.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let profile = UserProfile::from(&user);

    let items = eligible(wardrobe::repo::list_by_user(&st.db, user_id).await?);
    if items.is_empty() {
        return Err(AppError::EmptyWardrobe);
    }

    let prompt = build_prompt(&profile, &items, &occasion, &weather);
    let reply = st.ai.generate(&prompt, None).await?;

    let parsed = parse_or_default(&reply, Recommendation::fallback);
    if let Extracted::Fallback { raw, .. } = &parsed {
        warn!(%user_id, reply_chars = raw.len(), "stylist reply had no JSON, returning it as the explanation");
    }
    let rec = parsed.into_inner();
    let selected = resolve_selection(&items, &rec.indices());
    info!(%user_id, candidates = items.len(), selected = selected.len(), "outfit recommended");

    let entry = NewHistoryEntry {
        user_id,
        occasion: &occasion,
        weather_temp: weather.temperature,
        weather_condition: &weather.condition,
        outfit_items: selected.iter().map(|i| i.id).collect(),
        ai_explanation: &rec.explanation,
    };
    if let Err(e) = repo::insert_entry(&st.db, &entry).await {
        warn!(%user_id, error = %e, "failed to save outfit history");
    }

    Ok(RecommendResponse {
        items: selected,
        explanation: rec.explanation,
        missing_items: rec.missing_items,
        missing_items_explanation: rec.missing_items_explanation,
        weather,
        occasion,
        user_profile: profile,
    })
}
