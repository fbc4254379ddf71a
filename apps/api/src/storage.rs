//! # Product Image Storage
//!
//! Object storage for product photos, behind a trait so a bucket-backed
//! implementation can replace the local directory.
//!
//! ```text
//! upload ──► validate_image (type, size, signature) ──► ImageStore::put
//!                                                          │
//!                  <upload_dir>/<store_id>/<product_id>-<uuid>.<ext>
//!                                                          │
//!                  "<public_path>/<store_id>/<product_id>-<uuid>.<ext>"  ──► products.image_url
//! ```
//!
//! Nothing is written unless the image passed validation.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use adega_core::upload::ImageKind;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores an already validated image and returns its public URL.
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, StorageError>;
}

/// Object key for a product photo. A fresh suffix per upload keeps
/// cached copies of the previous photo from being served.
pub fn product_image_key(store_id: &str, product_id: &str, kind: ImageKind) -> String {
    format!(
        "{store_id}/{product_id}-{}.{}",
        Uuid::new_v4().simple(),
        kind.extension()
    )
}

/// Keys are two plain segments; anything that could escape the root is refused.
fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
        && !key.contains('\\');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Images written under a local directory, served by the API itself.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_path: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, public_path: impl Into<String>) -> Self {
        LocalImageStore {
            root: root.into(),
            public_path: public_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, key: &str, data: &[u8]) -> Result<String, StorageError> {
        check_key(key)?;

        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;

        debug!(path = %path.display(), bytes = data.len(), "Image stored");
        Ok(format!("{}/{}", self.public_path, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_under_root_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "/uploads/");

        let key = product_image_key("store-1", "prod-1", ImageKind::Png);
        assert!(key.starts_with("store-1/prod-1-") && key.ends_with(".png"));

        let url = store.put(&key, b"\x89PNG\r\n\x1a\nrest").await.unwrap();
        assert_eq!(url, format!("/uploads/{key}"));

        let written = tokio::fs::read(dir.path().join(&key)).await.unwrap();
        assert_eq!(written.len(), 12);
    }

    #[tokio::test]
    async fn test_escaping_keys_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path(), "/uploads");

        for key in ["../etc/passwd", "/abs.png", "a//b.png", "a/./b.png", ""] {
            assert!(matches!(
                store.put(key, b"x").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
