//! Task record: state + lease bookkeeping.

use chrono::{DateTime, Utc};

use crate::domain::{Task, TaskId, TaskState};

/// Everything the store tracks for one task.
///
/// Design:
/// - The record is owned by the store's task table; its index is the task id.
/// - `lease_generation` changes on every assignment (and on force-set), so a
///   lease timer can tell whether the assignment it guards is still current.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub state: TaskState,

    pub lease_generation: u64,

    /// How many times the task has been handed to a worker.
    pub assignments: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            state: TaskState::Pending,
            lease_generation: 0,
            assignments: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn view(&self, id: TaskId) -> Task {
        Task::new(id, self.state)
    }

    /// Pending -> Assigned. Returns the generation of the new lease.
    pub fn start_lease(&mut self) -> u64 {
        self.state = TaskState::Assigned;
        self.assignments += 1;
        self.lease_generation += 1;
        self.updated_at = Utc::now();
        self.lease_generation
    }

    /// Assigned -> Finished. `false` (and no change) from any other state.
    pub fn mark_finished(&mut self) -> bool {
        if self.state != TaskState::Assigned {
            return false;
        }
        self.state = TaskState::Finished;
        self.updated_at = Utc::now();
        true
    }

    /// Lease expiry: Assigned -> Pending, only if `generation` is still the
    /// lease the task is held under.
    pub fn release_lease(&mut self, generation: u64) -> bool {
        if self.state != TaskState::Assigned || self.lease_generation != generation {
            return false;
        }
        self.state = TaskState::Pending;
        self.updated_at = Utc::now();
        true
    }

    /// Overwrite the state, detaching any outstanding lease timer.
    pub fn force(&mut self, state: TaskState) {
        self.state = state;
        self.lease_generation += 1;
        self.updated_at = Utc::now();
    }
}

impl Default for TaskRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_requires_assigned() {
        let mut record = TaskRecord::new();
        assert!(!record.mark_finished());
        record.start_lease();
        assert!(record.mark_finished());
        assert!(!record.mark_finished());
        assert_eq!(record.state, TaskState::Finished);
    }

    #[test]
    fn stale_lease_does_not_release() {
        let mut record = TaskRecord::new();
        let first = record.start_lease();
        assert!(record.release_lease(first));
        let second = record.start_lease();
        assert!(!record.release_lease(first));
        assert_eq!(record.state, TaskState::Assigned);
        assert!(record.release_lease(second));
        assert_eq!(record.assignments, 2);
    }

    #[test]
    fn finished_is_never_released() {
        let mut record = TaskRecord::new();
        let generation = record.start_lease();
        record.mark_finished();
        assert!(!record.release_lease(generation));
        assert_eq!(record.state, TaskState::Finished);
    }

    #[test]
    fn force_detaches_current_lease() {
        let mut record = TaskRecord::new();
        let generation = record.start_lease();
        record.force(TaskState::Assigned);
        assert!(!record.release_lease(generation));
        assert_eq!(record.state, TaskState::Assigned);
    }
}
