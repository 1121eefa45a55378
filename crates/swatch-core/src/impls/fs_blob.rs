//! LocalBlobStore - ファイルシステム上の BlobStore
//!
//! `<root>/<phase>/<id>.png` に保存します。

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::{BlobPhase, TaskId};
use crate::error::SwatchError;
use crate::ports::{BlobStore, Registry, keys};

pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Build a store rooted at whatever the storage component published
    /// under `storageAddress`.
    pub async fn discover(registry: &dyn Registry) -> Result<Self, SwatchError> {
        let root = registry.require(keys::STORAGE_ADDRESS).await?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: TaskId, phase: BlobPhase) -> PathBuf {
        self.root
            .join(phase.as_str())
            .join(format!("{}.png", id.as_u64()))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, id: TaskId, phase: BlobPhase, bytes: Vec<u8>) -> Result<(), SwatchError> {
        let path = self.path_for(id, phase);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| SwatchError::upstream(&format!("create {}", dir.display()), e))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| SwatchError::upstream(&format!("write {}", path.display()), e))
    }

    async fn get(&self, id: TaskId, phase: BlobPhase) -> Result<Vec<u8>, SwatchError> {
        let path = self.path_for(id, phase);
        tokio::fs::read(&path)
            .await
            .map_err(|e| SwatchError::upstream(&format!("read {}", path.display()), e))
    }
}
