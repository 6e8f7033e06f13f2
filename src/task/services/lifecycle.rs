//! Service layer for task creation, priority changes, and cancellation.

use crate::task::{
    domain::{Priority, Task, TaskDomainError, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    priority: i64,
    due_by: Option<DateTime<Utc>>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    ///
    /// The priority is validated by the service, not here.
    #[must_use]
    pub fn new(title: impl Into<String>, priority: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority,
            due_by: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub fn with_due_by(mut self, due_by: DateTime<Utc>) -> Self {
        self.due_by = Some(due_by);
        self
    }
}

/// Coarse classification of service failures.
///
/// The command layer maps each kind to a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// The command carried an invalid value.
    InvalidArgument,
    /// The addressed task does not exist.
    NotFound,
    /// A task with the same identifier already exists.
    AlreadyExists,
    /// The lifecycle table rejects the requested status change.
    InvalidTransition,
    /// A concurrent writer won; reload and retry.
    ConflictRetry,
    /// The storage backend failed.
    StorageUnavailable,
}

impl TaskErrorKind {
    /// Returns a stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "InvalidArgument",
            Self::NotFound => "NotFound",
            Self::AlreadyExists => "AlreadyExists",
            Self::InvalidTransition => "InvalidTransition",
            Self::ConflictRetry => "ConflictRetry",
            Self::StorageUnavailable => "StorageUnavailable",
        }
    }
}

impl fmt::Display for TaskErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

impl TaskLifecycleError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        match self {
            Self::Domain(TaskDomainError::InvalidPriority(_) | TaskDomainError::EmptyTitle) => {
                TaskErrorKind::InvalidArgument
            }
            Self::Domain(TaskDomainError::InvalidTransition { .. }) => {
                TaskErrorKind::InvalidTransition
            }
            Self::NotFound(_) | Self::Repository(TaskRepositoryError::NotFound(_)) => {
                TaskErrorKind::NotFound
            }
            Self::Repository(TaskRepositoryError::AlreadyExists(_)) => {
                TaskErrorKind::AlreadyExists
            }
            Self::Repository(TaskRepositoryError::ConflictRetry(_)) => {
                TaskErrorKind::ConflictRetry
            }
            Self::Repository(TaskRepositoryError::StorageUnavailable(_)) => {
                TaskErrorKind::StorageUnavailable
            }
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Holds no state of its own between calls; every command loads the task
/// from the repository, checks it, and writes it back through the same
/// repository.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .get(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    /// Checks the transition table, then writes the new status.
    async fn transition(&self, mut task: Task, target: TaskStatus) -> TaskLifecycleResult<Task> {
        let from = task.status();
        if !from.can_transition_to(target) {
            return Err(TaskDomainError::InvalidTransition {
                task_id: task.id(),
                from,
                to: target,
            }
            .into());
        }
        task.set_status(target, &*self.clock);
        Ok(self.repository.update(&task).await?)
    }

    /// Creates a pending task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an empty title or a priority
    /// outside `1..=10` (nothing is written), or
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        if request.title.trim().is_empty() {
            return Err(TaskDomainError::EmptyTitle.into());
        }
        let priority = Priority::new(request.priority)?;

        let task = Task::new(
            request.title,
            request.description,
            priority,
            request.due_by,
            &*self.clock,
        );
        let created = self.repository.create(&task).await?;
        tracing::info!(task_id = %created.id(), priority = %created.priority(), "created task");
        Ok(created)
    }

    /// Retrieves a task by identifier.
    ///
    /// Returns `Ok(None)` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn get(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.get(task_id).await?)
    }

    /// Changes a task's priority regardless of its status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for a priority outside `1..=10`
    /// (storage is not touched), [`TaskLifecycleError::NotFound`] when the
    /// task does not exist, or [`TaskLifecycleError::Repository`] when the
    /// write fails or loses a race.
    pub async fn change_priority(
        &self,
        task_id: TaskId,
        priority: i64,
    ) -> TaskLifecycleResult<Task> {
        let new_priority = Priority::new(priority)?;
        let mut task = self.find_task_or_error(task_id).await?;
        task.set_priority(new_priority, &*self.clock);
        let updated = self.repository.update(&task).await?;
        tracing::info!(task_id = %task_id, priority = %new_priority, "changed task priority");
        Ok(updated)
    }

    /// Cancels a pending or running task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] when the task does not exist,
    /// [`TaskLifecycleError::Domain`] with
    /// [`TaskDomainError::InvalidTransition`] when the task is already
    /// finished, or [`TaskLifecycleError::Repository`] when the write fails.
    pub async fn cancel(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let task = self.find_task_or_error(task_id).await?;
        let cancelled = self.transition(task, TaskStatus::Cancelled).await?;
        tracing::info!(task_id = %task_id, "cancelled task");
        Ok(cancelled)
    }
}
