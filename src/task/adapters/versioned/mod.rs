//! Versioned-store adapter: tasks as items in a conditional-write table.

mod repository;

pub use repository::{
    TASK_PARTITION_KEY, TASK_SORT_KEY_PREFIX, VersionedTask, VersionedTaskRepository, task_key,
};
