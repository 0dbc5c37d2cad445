//! Duplicate-image detection by content hash.

use bytes::Bytes;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{repo, repo_types::WardrobeItem};
use crate::error::AppResult;
use crate::storage::StorageClient;

/// Lowercase hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// [`hash_bytes`] off the async runtime; uploads can be several megabytes.
pub async fn hash_blob(data: Bytes) -> anyhow::Result<String> {
    let digest = tokio::task::spawn_blocking(move || hash_bytes(&data)).await?;
    Ok(digest)
}

/// First item of `user_id` whose stored image hashes to `digest`.
///
/// Items whose image is gone from storage, or cannot be read, are skipped.
/// Only a failure to list the items is reported.
pub async fn find_duplicate(
    db: &SqlitePool,
    storage: &dyn StorageClient,
    user_id: Uuid,
    digest: &str,
) -> AppResult<Option<WardrobeItem>> {
    let items = repo::list_by_user(db, user_id).await?;
    debug!(%user_id, candidates = items.len(), "checking for duplicate image");

    for item in items {
        let data = match storage.get_object(&item.image_path).await {
            Ok(Some(data)) => data,
            Ok(None) => continue,
            Err(e) => {
                warn!(item_id = %item.id, error = %e, "unreadable wardrobe image skipped");
                continue;
            }
        };
        if hash_blob(data).await? == digest {
            info!(%user_id, item_id = %item.id, "duplicate image detected");
            return Ok(Some(item));
        }
    }
    Ok(None)
}
