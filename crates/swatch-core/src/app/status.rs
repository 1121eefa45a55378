//! Status - タスク一覧と状態ごとの件数

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskId};
use crate::ports::StateCounts;

/// Snapshot for operators: every task, per-state counts, and the scan cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub counts: StateCounts,
    pub watermark: TaskId,
    pub tasks: Vec<Task>,
}

impl StatusReport {
    pub fn new(tasks: Vec<Task>, watermark: TaskId) -> Self {
        let mut counts = StateCounts::default();
        for task in &tasks {
            counts.record(task.state);
        }
        Self {
            counts,
            watermark,
            tasks,
        }
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pending={} assigned={} finished={} watermark={}",
            self.counts.pending, self.counts.assigned, self.counts.finished, self.watermark
        )?;
        for task in &self.tasks {
            writeln!(f, "{} : id: {} state: {}", task.id, task.id.as_u64(), task.state.ordinal())?;
        }
        Ok(())
    }
}
