use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{DeleteResponse, UploadResponse},
    repo,
    repo_types::WardrobeItem,
    services::{delete_item, upload_and_classify, UploadItem, MAX_UPLOAD_BYTES},
};
use crate::{
    auth::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/wardrobe", get(list_items))
        .route("/wardrobe/:id", delete(delete_wardrobe_item))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        // room for multipart framing around a maximal image
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<WardrobeItem>>> {
    let items = repo::list_by_user(&state.db, user_id).await?;
    info!(%user_id, count = items.len(), "wardrobe listed");
    Ok(Json(items))
}

/// POST /upload (multipart), field `image`
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut upload = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e.body_text())))?
    {
        if field.name() == Some("image") {
            upload = Some(read_image(field).await?);
            break;
        }
    }
    let upload = upload.ok_or_else(|| AppError::Validation("No image file uploaded".into()))?;

    let outcome = upload_and_classify(&state, user_id, upload).await?;
    Ok(Json(UploadResponse {
        success: true,
        id: outcome.item.id,
        ai_analysis: outcome.analysis,
        image_path: outcome.item.image_path,
    }))
}

async fn read_image(field: Field<'_>) -> AppResult<UploadItem> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("Only image files are allowed!".into()));
    }
    let file_name = field.file_name().map(str::to_string);
    let body = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {}", e.body_text())))?;
    if body.is_empty() {
        return Err(AppError::Validation("No image file uploaded".into()));
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("Image exceeds the 5MB limit".into()));
    }
    Ok(UploadItem {
        body,
        content_type,
        file_name,
    })
}

#[instrument(skip(state))]
pub async fn delete_wardrobe_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted_rows = delete_item(&state, user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".into()))?;
    info!(%user_id, item_id = %id, "wardrobe item deleted");
    Ok(Json(DeleteResponse {
        success: true,
        deleted_rows,
    }))
}
