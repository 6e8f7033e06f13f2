//! Repository port for task persistence and lookup.

use crate::task::domain::{Task, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Implementations are the only code allowed to mutate stored tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and returns the persisted value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::AlreadyExists`] when the task ID is
    /// already stored.
    async fn create(&self, task: &Task) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn get(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Replaces an existing task and returns the persisted value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist
    /// and [`TaskRepositoryError::ConflictRetry`] when a versioned store saw
    /// a concurrent write between its read and its conditional write.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The stored version changed between read and write; reload and retry.
    #[error("concurrent modification of task {0}, reload and retry")]
    ConflictRetry(TaskId),

    /// The storage backend could not be reached or returned garbage.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a storage failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::StorageUnavailable(Arc::new(err))
    }
}
