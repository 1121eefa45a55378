use serde::{Deserialize, Serialize};

use super::{TaskId, TaskState};

/// The externally visible view of a task: id + state.
///
/// Serialized as `{"Id": 3, "State": 1}`, the shape workers and the admin
/// surface exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Task {
    pub id: TaskId,
    pub state: TaskState,
}

impl Task {
    pub fn new(id: TaskId, state: TaskState) -> Self {
        Self { id, state }
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_pascal_case_and_ordinals() {
        let task = Task::new(TaskId::new(3), TaskState::Assigned);
        let json = serde_json::to_value(task).unwrap();
        assert_eq!(json, serde_json::json!({ "Id": 3, "State": 1 }));
    }

    #[test]
    fn decodes_worker_payload() {
        let task: Task = serde_json::from_str(r#"{"Id":0,"State":2}"#).unwrap();
        assert_eq!(task.id, TaskId::new(0));
        assert!(task.is_finished());
    }
}
