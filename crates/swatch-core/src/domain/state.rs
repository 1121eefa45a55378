//! Task state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SwatchError;

/// Task state.
///
/// State transitions:
/// - Pending -> Assigned (assignment scan)
/// - Assigned -> Finished (finish report)
/// - Assigned -> Pending (lease expiry)
///
/// On the wire the state is its ordinal: 0 / 1 / 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TaskState {
    /// Waiting for a worker.
    Pending,

    /// Held by a worker under a lease.
    Assigned,

    /// Output stored and reported. Terminal.
    Finished,
}

impl TaskState {
    pub fn ordinal(self) -> u8 {
        match self {
            TaskState::Pending => 0,
            TaskState::Assigned => 1,
            TaskState::Finished => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Finished)
    }

    /// Eligible for assignment?
    pub fn is_assignable(self) -> bool {
        matches!(self, TaskState::Pending)
    }
}

impl From<TaskState> for u8 {
    fn from(state: TaskState) -> Self {
        state.ordinal()
    }
}

impl TryFrom<u8> for TaskState {
    type Error = SwatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TaskState::Pending),
            1 => Ok(TaskState::Assigned),
            2 => Ok(TaskState::Finished),
            other => Err(SwatchError::InvalidState(format!(
                "state ordinal {other} is not one of 0, 1, 2"
            ))),
        }
    }
}

impl TryFrom<i64> for TaskState {
    type Error = SwatchError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| {
                SwatchError::InvalidState(format!("state ordinal {value} is not one of 0, 1, 2"))
            })
            .and_then(TaskState::try_from)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskState::Pending => "pending",
            TaskState::Assigned => "assigned",
            TaskState::Finished => "finished",
        };
        f.write_str(name)
    }
}
