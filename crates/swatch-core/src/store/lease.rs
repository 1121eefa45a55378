//! Lease expiry.
//!
//! A lease is not stored anywhere: it is a one-shot timer spawned when a task
//! is assigned. When it fires it re-checks the record under the map lock and
//! only reverts the task if it is still held under the same lease.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::TaskRecord;
use crate::domain::TaskId;

pub const DEFAULT_LEASE: Duration = Duration::from_secs(120);

/// How long a worker may hold an Assigned task before it is reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeasePolicy {
    duration: Duration,
}

impl LeasePolicy {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl Default for LeasePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE)
    }
}

pub(super) fn spawn_expiry(
    tasks: Arc<RwLock<Vec<TaskRecord>>>,
    id: TaskId,
    generation: u64,
    after: Duration,
) -> JoinHandle<bool> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        expire(&tasks, id, generation).await
    })
}

async fn expire(tasks: &RwLock<Vec<TaskRecord>>, id: TaskId, generation: u64) -> bool {
    let mut tasks = tasks.write().await;
    let Some(record) = tasks.get_mut(id.index()) else {
        return false;
    };

    if record.release_lease(generation) {
        tracing::warn!(task_id = %id, generation, "lease expired, task returned to pending");
        true
    } else {
        tracing::debug!(task_id = %id, generation, state = %record.state, "lease expiry is a no-op");
        false
    }
}
