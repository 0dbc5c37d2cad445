mod client;
pub mod handlers;

pub use client::{WeatherClient, WeatherReport};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::weather_routes()
}
