//! Filesystem blob store for uploaded file bytes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::core::errors::RagError;

use super::BlobStore;

/// Stores blobs as plain files under a root directory.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, RagError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            matches!(component, Component::ParentDir | Component::RootDir | Component::Prefix(_))
        });
        if escapes || path.is_empty() {
            return Err(RagError::store(format!("invalid blob path: {path:?}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), RagError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(RagError::store)?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(RagError::store)?;
        Ok(())
    }
}
