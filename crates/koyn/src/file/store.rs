//! Attachment object store.
//!
//! Services see only the [`ObjectStore`] trait; the filesystem
//! implementation below is the local-first default. Keys are
//! store-relative, `<dir>/<uuid>_<name>`.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Handle to a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Store-relative key, e.g. `posts/<uuid>_report.pdf`.
    pub key: String,
    /// URL under which the object is served.
    pub url: String,
}

/// Collaborator boundary around attachment storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store an object under a fresh collision-free key.
    async fn put(&self, dir: &str, original_name: &str, bytes: &[u8]) -> Result<StoredObject>;

    /// Read an object back; `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove an object. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Filesystem-backed object store.
pub struct FsObjectStore {
    root: PathBuf,
    public_base: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a key below the store root. Keys never escape it.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.starts_with('/') || key.split(['/', '\\']).any(|seg| seg == "..") {
            bail!("invalid object key: {key}");
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, dir: &str, original_name: &str, bytes: &[u8]) -> Result<StoredObject> {
        let key = format!("{}/{}", dir, stored_name(original_name));
        let path = self.path_for(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating store directory: {}", parent.display()))?;
        }

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing object: {}", path.display()))?;

        debug!("stored object: {key}");
        Ok(StoredObject {
            url: format!("{}/{}", self.public_base, key),
            key,
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading object: {}", path.display())),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing object: {}", path.display())),
        }
    }
}

/// Build a collision-free stored name: `<uuid>_<sanitized original>`.
fn stored_name(original: &str) -> String {
    // Drop any client-supplied directory part, keep a conservative charset.
    let base = original.rsplit(['/', '\\']).next().unwrap_or("file");
    let safe: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let safe = if safe.is_empty() {
        "file".to_string()
    } else {
        safe
    };
    format!("{}_{}", Uuid::new_v4(), safe)
}
