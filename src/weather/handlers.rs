use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::WeatherReport;
use crate::state::AppState;

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(current_weather))
}

#[instrument(skip(state))]
pub async fn current_weather(State(state): State<AppState>) -> Json<WeatherReport> {
    Json(state.weather.current().await)
}
