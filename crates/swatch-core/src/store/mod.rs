//! Task store: the single source of truth for task lifecycle.

mod lease;
mod memory;
mod record;

pub use lease::{DEFAULT_LEASE, LeasePolicy};
pub use memory::InMemoryTaskStore;
pub use record::TaskRecord;
