//! InMemoryBlobStore - テスト・デモ用の BlobStore

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{BlobPhase, TaskId};
use crate::error::SwatchError;
use crate::ports::BlobStore;

#[derive(Default)]
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<(TaskId, BlobPhase), Vec<u8>>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: TaskId, phase: BlobPhase) -> bool {
        self.blobs.read().await.contains_key(&(id, phase))
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, id: TaskId, phase: BlobPhase, bytes: Vec<u8>) -> Result<(), SwatchError> {
        self.blobs.write().await.insert((id, phase), bytes);
        Ok(())
    }

    async fn get(&self, id: TaskId, phase: BlobPhase) -> Result<Vec<u8>, SwatchError> {
        self.blobs
            .read()
            .await
            .get(&(id, phase))
            .cloned()
            .ok_or_else(|| SwatchError::UpstreamUnavailable(format!("no {phase} blob for {id}")))
    }
}
