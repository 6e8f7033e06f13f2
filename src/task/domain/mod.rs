//! Domain model for task tracking.
//!
//! The task domain models the task record, its validated scalars, and the
//! lifecycle transition table while keeping all infrastructure concerns
//! outside of the domain boundary.

mod error;
mod ids;
mod status;
mod task;

pub use error::{ParseTaskStatusError, TaskDomainError};
pub use ids::{Priority, TaskId};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task};
