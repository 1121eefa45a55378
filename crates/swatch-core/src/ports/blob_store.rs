//! BlobStore port - 画像バイト列の保存先
//!
//! キーは `(TaskId, BlobPhase)`。中身は不透明なバイト列として扱います。

use async_trait::async_trait;

use crate::domain::{BlobPhase, TaskId};
use crate::error::SwatchError;

/// Byte storage keyed by task id and phase.
///
/// Implementations report every failure as `UpstreamUnavailable`; callers in
/// the core never retry.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, id: TaskId, phase: BlobPhase, bytes: Vec<u8>) -> Result<(), SwatchError>;

    async fn get(&self, id: TaskId, phase: BlobPhase) -> Result<Vec<u8>, SwatchError>;
}
