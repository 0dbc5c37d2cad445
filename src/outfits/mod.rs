mod dto;
pub mod handlers;
pub mod recommend;
pub mod repo;
mod repo_types;
pub mod services;

pub use repo_types::OutfitHistoryEntry;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::outfit_routes()
}
