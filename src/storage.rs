use std::{
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use time::OffsetDateTime;

/// Key prefix of every stored image; also the URL prefix it is served under.
pub const PUBLIC_PREFIX: &str = "uploads";

#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// `None` when nothing is stored under `key`.
    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>>;
    /// `false` when nothing was stored under `key`.
    async fn delete_object(&self, key: &str) -> anyhow::Result<bool>;
}

/// Images on the local filesystem, keyed `uploads/<file name>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub async fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create upload dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        let name = key
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .with_context(|| format!("key outside {PUBLIC_PREFIX}/: {key}"))?;
        let rel = Path::new(name);
        anyhow::ensure!(
            !name.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_))),
            "invalid storage key: {key}"
        );
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, _content_type: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<Option<Bytes>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}

/// `uploads/<unix millis>-<random>.<ext>` for a freshly received image.
pub fn new_object_key(content_type: &str, original_name: Option<&str>) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let salt: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = ext_from_mime(content_type)
        .map(str::to_string)
        .or_else(|| original_name.and_then(ext_from_name))
        .unwrap_or_else(|| "bin".to_string());
    format!("{PUBLIC_PREFIX}/{millis}-{salt}.{ext}")
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

fn ext_from_name(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn key_falls_back_to_file_name_then_bin() {
        let key = new_object_key("image/x-tiff", Some("Scan.TIFF"));
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".tiff"));
        assert!(new_object_key("image/x-unknown", None).ends_with(".bin"));
        assert!(new_object_key("image/png", Some("a.jpg")).ends_with(".png"));
    }

    #[tokio::test]
    async fn put_get_delete_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        let key = "uploads/a.png";

        storage.put_object(key, Bytes::from_static(b"png"), "image/png").await.unwrap();
        assert!(dir.path().join("a.png").exists());
        assert_eq!(storage.get_object(key).await.unwrap().unwrap(), Bytes::from_static(b"png"));

        assert!(storage.delete_object(key).await.unwrap());
        assert!(!storage.delete_object(key).await.unwrap());
        assert!(storage.get_object(key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_keys_escaping_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path()).await.unwrap();
        assert!(storage.get_object("uploads/../secret").await.is_err());
        assert!(storage.get_object("elsewhere/a.png").await.is_err());
        assert!(storage.get_object("uploads/").await.is_err());
    }
}
