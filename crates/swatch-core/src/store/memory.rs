//! In-memory task store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::lease::spawn_expiry;
use super::{LeasePolicy, TaskRecord};
use crate::domain::{Task, TaskId, TaskState};
use crate::error::SwatchError;
use crate::ports::TaskStore;

/// Memory-resident task store. Everything is lost when the process exits.
///
/// Locking:
/// - `tasks` (the map lock) guards the task table; index == task id.
/// - `watermark` guards the scan cursor.
/// - When both are needed (assignment) the watermark lock is taken first.
///   Nothing ever takes the watermark lock while holding the map lock.
pub struct InMemoryTaskStore {
    tasks: Arc<RwLock<Vec<TaskRecord>>>,
    watermark: RwLock<u64>,
    lease: LeasePolicy,
}

impl InMemoryTaskStore {
    pub fn new(lease: LeasePolicy) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(Vec::new())),
            watermark: RwLock::new(0),
            lease,
        }
    }

    pub fn lease_policy(&self) -> LeasePolicy {
        self.lease
    }

    /// Full record for a task (for status views and tests).
    pub async fn record(&self, id: TaskId) -> Option<TaskRecord> {
        let tasks = self.tasks.read().await;
        tasks.get(id.index()).cloned()
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new(LeasePolicy::default())
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(&self) -> TaskId {
        let mut tasks = self.tasks.write().await;
        let id = TaskId::new(tasks.len() as u64);
        tasks.push(TaskRecord::new());
        drop(tasks);

        tracing::debug!(task_id = %id, "task created");
        id
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, SwatchError> {
        let tasks = self.tasks.read().await;
        tasks
            .get(id.index())
            .map(|record| record.view(id))
            .ok_or(SwatchError::NotFound(id))
    }

    async fn assign_next(&self) -> Result<Option<Task>, SwatchError> {
        let mut watermark = self.watermark.write().await;
        let mut tasks = self.tasks.write().await;

        let mut i = *watermark as usize;
        while i < tasks.len() {
            let record = &mut tasks[i];

            // Only a Finished task sitting exactly at the watermark moves it.
            if record.state == TaskState::Finished && i as u64 == *watermark {
                *watermark += 1;
                i += 1;
                continue;
            }

            if record.state.is_assignable() {
                let id = TaskId::new(i as u64);
                let generation = record.start_lease();
                spawn_expiry(
                    Arc::clone(&self.tasks),
                    id,
                    generation,
                    self.lease.duration(),
                );
                tracing::info!(task_id = %id, generation, watermark = *watermark, "task assigned");
                return Ok(Some(record.view(id)));
            }

            i += 1;
        }

        tracing::debug!(watermark = *watermark, "no pending task");
        Ok(None)
    }

    async fn finish(&self, id: TaskId) -> Result<(), SwatchError> {
        let mut tasks = self.tasks.write().await;
        let Some(record) = tasks.get_mut(id.index()) else {
            return Err(SwatchError::InvalidState(format!("{id} does not exist")));
        };

        if !record.mark_finished() {
            return Err(SwatchError::InvalidState(format!(
                "{id} is {}, expected assigned",
                record.state
            )));
        }

        tracing::info!(task_id = %id, "task finished");
        Ok(())
    }

    async fn force_set(&self, id: TaskId, state: TaskState) -> Result<(), SwatchError> {
        let mut tasks = self.tasks.write().await;
        let Some(record) = tasks.get_mut(id.index()) else {
            return Err(SwatchError::InvalidState(format!("{id} does not exist")));
        };

        let previous = record.state;
        record.force(state);
        tracing::warn!(task_id = %id, %previous, %state, "task state forced");
        Ok(())
    }

    async fn list(&self) -> Vec<Task> {
        let tasks = self.tasks.read().await;
        tasks
            .iter()
            .enumerate()
            .map(|(i, record)| record.view(TaskId::new(i as u64)))
            .collect()
    }

    async fn watermark(&self) -> TaskId {
        TaskId::new(*self.watermark.read().await)
    }

    async fn snapshot(&self) -> (TaskId, Vec<Task>) {
        // same order as assign_next: watermark, then map
        let watermark = self.watermark.read().await;
        let tasks = self.tasks.read().await;
        let view = tasks
            .iter()
            .enumerate()
            .map(|(i, record)| record.view(TaskId::new(i as u64)))
            .collect();
        (TaskId::new(*watermark), view)
    }
}
