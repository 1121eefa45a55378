//! Domain model (ids, task state, blob phase).
//!
//! Architecture-agnostic: nothing here knows about locks, timers or workers.

pub mod ids;
pub mod phase;
pub mod state;
pub mod task;

pub use ids::TaskId;
pub use phase::BlobPhase;
pub use state::TaskState;
pub use task::Task;
