//! Хранилище загруженных файлов.

use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Сохраняет байты по ключу и возвращает публичный URL.
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<String>;
}

/// Файлы на локальном диске, отдаются статикой по `base_url`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    base_path: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.into(),
        }
    }

    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(self.base_path.join("events")).await
    }

    fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        if relative.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid storage key: {}", key),
            ));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<String> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "blob stored");

        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let root = std::env::temp_dir().join(format!("blob-test-{}", Uuid::new_v4()));
        let store = LocalBlobStore::new(&root, "https://cdn.example.com/uploads/");

        let url = store.put("events/abc/photo.jpg", b"jpeg").await.unwrap();

        assert_eq!(url, "https://cdn.example.com/uploads/events/abc/photo.jpg");
        let written = tokio::fs::read(root.join("events/abc/photo.jpg")).await.unwrap();
        assert_eq!(written, b"jpeg");
        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn keys_cannot_escape_base_path() {
        let store = LocalBlobStore::new(std::env::temp_dir(), "/uploads");
        assert!(store.put("../etc/passwd", b"x").await.is_err());
        assert!(store.put("/abs/file", b"x").await.is_err());
    }
}
