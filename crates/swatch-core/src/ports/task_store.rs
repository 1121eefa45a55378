//! TaskStore port - タスク状態の正本（source of truth）
//!
//! 状態遷移（create / assign / finish / lease expiry）はすべてここを通ります。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskId, TaskState};
use crate::error::SwatchError;

/// Number of tasks per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: usize,
    pub assigned: usize,
    pub finished: usize,
}

impl StateCounts {
    pub fn record(&mut self, state: TaskState) {
        match state {
            TaskState::Pending => self.pending += 1,
            TaskState::Assigned => self.assigned += 1,
            TaskState::Finished => self.finished += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.assigned + self.finished
    }
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Allocate the next sequential id and insert a Pending task.
    async fn create_task(&self) -> TaskId;

    /// `NotFound` if `id` was never allocated.
    async fn get_task(&self, id: TaskId) -> Result<Task, SwatchError>;

    /// Find the lowest-id Pending task, mark it Assigned and start its lease.
    ///
    /// `Ok(None)` means there is nothing to do right now; that is not an error.
    async fn assign_next(&self) -> Result<Option<Task>, SwatchError>;

    /// Assigned -> Finished. Any other current state (or an unknown id) is
    /// rejected with `InvalidState`.
    async fn finish(&self, id: TaskId) -> Result<(), SwatchError>;

    /// Administrative override that ignores the state machine entirely.
    ///
    /// No lease is started when forcing `Assigned`, and a `Finished` task can
    /// be pushed back to `Pending`.
    async fn force_set(&self, id: TaskId, state: TaskState) -> Result<(), SwatchError>;

    /// Point-in-time snapshot ordered by id.
    async fn list(&self) -> Vec<Task>;

    /// Lowest id not yet confirmed Finished (scan cursor, may lag).
    async fn watermark(&self) -> TaskId;

    /// Watermark and task list read as one consistent view.
    ///
    /// The default reads them separately; stores with real locks should
    /// override it.
    async fn snapshot(&self) -> (TaskId, Vec<Task>) {
        let watermark = self.watermark().await;
        (watermark, self.list().await)
    }

    async fn counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for task in self.list().await {
            counts.record(task.state);
        }
        counts
    }
}
