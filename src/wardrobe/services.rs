use bytes::Bytes;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::{
    dedup::{find_duplicate, hash_blob},
    dto::ClothingAnalysis,
    repo,
    repo_types::{NewItem, WardrobeItem},
};
use crate::{
    ai::{
        parser::{parse_or_default, Extracted},
        InlineImage,
    },
    error::{AppError, AppResult, DuplicateInfo},
    state::AppState,
    storage::new_object_key,
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const CLASSIFY_PROMPT: &str = r#"You are a witty and intelligent AI fashion assistant with a great sense of humor! Analyze this image.

FIRST, determine what the image actually contains:
- If it's a single clothing item: Analyze it normally
- If it's multiple clothing items: Make a playful comment about being asked to pick just one
- If it's NOT clothing at all: Be clever and funny about what you actually see

For CLOTHING items:
- Categories: Shirt, T-Shirt, Pants, Jeans, Skirt, Dress, Shoes, Jacket, Accessories
- Gender: Determine if the item is typically for Male, Female, or Unisex

Respond with valid JSON in this format:
{
  "category": "item type (or 'Not Clothing' if applicable)",
  "color": "primary color (or 'N/A')",
  "gender": "Male, Female, or Unisex (or 'N/A' if not clothing)",
  "description": "Your intelligent, contextual, and potentially humorous response"
}

Be creative, be funny when appropriate, but always be helpful!"#;

/// An image received from the client, already checked to be `image/*`.
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
    pub file_name: Option<String>,
}

pub struct UploadOutcome {
    pub item: WardrobeItem,
    pub analysis: ClothingAnalysis,
}

/// Store, de-duplicate, classify and record one uploaded image.
#[instrument(skip(st, upload), fields(bytes = upload.body.len()))]
pub async fn upload_and_classify(
    st: &AppState,
    user_id: Uuid,
    upload: UploadItem,
) -> AppResult<UploadOutcome> {
    let key = new_object_key(&upload.content_type, upload.file_name.as_deref());
    st.storage
        .put_object(&key, upload.body.clone(), &upload.content_type)
        .await?;

    let digest = hash_blob(upload.body.clone()).await?;
    let duplicate = match find_duplicate(&st.db, st.storage.as_ref(), user_id, &digest).await {
        Ok(found) => found,
        Err(e) => {
            // a failed secondary check must not block the upload
            error!(error = %e, "duplicate check failed, continuing");
            None
        }
    };

    if let Some(existing) = duplicate {
        discard(st, &key).await;
        return Err(AppError::DuplicateImage(DuplicateInfo {
            category: existing.category.label().to_string(),
            color: existing.color,
            description: existing.description,
        }));
    }

    let image = InlineImage {
        data: upload.body,
        mime_type: upload.content_type,
    };
    let reply = match st.ai.generate(CLASSIFY_PROMPT, Some(&image)).await {
        Ok(text) => text,
        Err(e) => {
            discard(st, &key).await;
            return Err(e.into());
        }
    };

    let parsed = parse_or_default(&reply, ClothingAnalysis::fallback);
    if let Extracted::Fallback { raw, .. } = &parsed {
        warn!(reply_chars = raw.len(), "classifier reply had no JSON, using fallback analysis");
    }
    let analysis = parsed.into_inner();

    let new_item = NewItem {
        user_id,
        category: analysis.category.clone(),
        color: analysis.color.clone(),
        gender: Some(analysis.gender.clone().unwrap_or_else(|| "N/A".into())),
        image_path: key.clone(),
        description: Some(analysis.description.clone()),
    };
    let item = match repo::insert_item(&st.db, &new_item).await {
        Ok(item) => item,
        Err(e) => {
            discard(st, &key).await;
            return Err(e.into());
        }
    };

    info!(%user_id, item_id = %item.id, category = %item.category, "wardrobe item stored");
    Ok(UploadOutcome { item, analysis })
}

async fn discard(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(key, error = %e, "failed to remove rejected upload");
    }
}

/// Delete an owned item and its image; `None` when the user has no such item.
pub async fn delete_item(st: &AppState, user_id: Uuid, item_id: Uuid) -> AppResult<Option<u64>> {
    let Some(item) = repo::find_owned(&st.db, user_id, item_id).await? else {
        return Ok(None);
    };

    match st.storage.delete_object(&item.image_path).await {
        Ok(true) => info!(path = %item.image_path, "deleted image file"),
        Ok(false) => warn!(path = %item.image_path, "image file already gone"),
        Err(e) => warn!(path = %item.image_path, error = %e, "could not delete image file"),
    }

    let deleted = repo::delete_owned(&st.db, user_id, item_id).await?;
    Ok(Some(deleted))
}
