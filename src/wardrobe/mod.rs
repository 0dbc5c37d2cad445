mod category;
pub mod dedup;
mod dto;
pub mod handlers;
pub mod repo;
pub(crate) mod repo_types;
pub mod services;

pub use category::Category;
pub use repo_types::WardrobeItem;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::item_routes())
        .merge(handlers::upload_routes())
}
