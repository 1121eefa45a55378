//! Orchestrator - producer / worker と TaskStore の仲介
//!
//! # フロー（submit）
//! 1. TaskStore::create_task() で id を確保
//! 2. BlobStore::put(id, working) で入力画像を保存
//! 3. Notifier::notify(id) をバックグラウンドで投げっぱなし
//! 4. id を返す（通知やワーカーの処理は待たない）

use std::sync::Arc;

use super::requests::ForceSetRequest;
use super::status::StatusReport;
use crate::domain::{BlobPhase, Task, TaskId, TaskState};
use crate::error::SwatchError;
use crate::ports::{BlobStore, Notifier, StateCounts, TaskStore};

/// Lifecycle operations for producers (upload path) and consumers (workers).
///
/// Nothing here retries: store errors go straight back to the caller, and
/// notification failures are only logged.
pub struct Orchestrator {
    store: Arc<dyn TaskStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn TaskStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            blobs,
            notifier,
        }
    }

    /// Register a new image and return its task id.
    ///
    /// If the blob write fails the task has already been created and stays
    /// Pending with no input; nothing cleans it up.
    pub async fn submit_new_task(&self, input: Vec<u8>) -> Result<TaskId, SwatchError> {
        let id = self.store.create_task().await;

        if let Err(err) = self.blobs.put(id, BlobPhase::Working, input).await {
            tracing::error!(task_id = %id, error = %err, "input blob not stored, task left pending");
            return Err(err);
        }

        tracing::info!(task_id = %id, "notifying workers that there is a task to be done");
        self.signal(id);
        Ok(id)
    }

    /// Best-effort wake-up. Runs detached and a failure is not retried.
    fn signal(&self, id: TaskId) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.notify(id).await {
                Ok(()) => tracing::debug!(task_id = %id, "notification delivered"),
                Err(err) => {
                    tracing::warn!(task_id = %id, error = %err, "notification dropped, polling will pick it up")
                }
            }
        });
    }

    /// `Ok(None)` when no Pending task exists.
    pub async fn request_task(&self) -> Result<Option<Task>, SwatchError> {
        self.store.assign_next().await
    }

    /// Unknown ids are `NotFound`; known ids not in Assigned are `InvalidState`.
    pub async fn report_finished(&self, id: TaskId) -> Result<(), SwatchError> {
        self.store.get_task(id).await?;
        self.store.finish(id).await
    }

    pub async fn query_ready(&self, id: TaskId) -> Result<bool, SwatchError> {
        Ok(self.store.get_task(id).await?.is_finished())
    }

    /// Download path: the transformed image of a Finished task.
    pub async fn fetch_result(&self, id: TaskId) -> Result<Vec<u8>, SwatchError> {
        let task = self.store.get_task(id).await?;
        if !task.is_finished() {
            return Err(SwatchError::InvalidState(format!(
                "{id} is {}, result not ready",
                task.state
            )));
        }
        self.blobs.get(id, BlobPhase::Finished).await
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task, SwatchError> {
        self.store.get_task(id).await
    }

    /// Administrative override; see [`TaskStore::force_set`].
    /// Unknown ids are `NotFound`, as for `report_finished`.
    pub async fn force_set(&self, id: TaskId, state: TaskState) -> Result<(), SwatchError> {
        self.store.get_task(id).await?;
        self.store.force_set(id, state).await
    }

    /// Apply a decoded force-set body.
    pub async fn apply_force_set(&self, request: ForceSetRequest) -> Result<Task, SwatchError> {
        let (id, state) = request.into_parts()?;
        self.force_set(id, state).await?;
        self.store.get_task(id).await
    }

    pub async fn list(&self) -> Vec<Task> {
        self.store.list().await
    }

    pub async fn counts(&self) -> StateCounts {
        self.store.counts().await
    }

    pub async fn status(&self) -> StatusReport {
        let (watermark, tasks) = self.store.snapshot().await;
        StatusReport::new(tasks, watermark)
    }
}
