//! In-memory task repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Readers share the lock; `create` and `update` hold it exclusively, which
/// is all the isolation this backend needs since nothing is awaited while
/// the lock is held.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StorageUnavailable`] when the lock is
    /// poisoned.
    pub fn len(&self) -> TaskRepositoryResult<usize> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.len())
    }

    /// Returns whether no task is stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StorageUnavailable`] when the lock is
    /// poisoned.
    pub fn is_empty(&self) -> TaskRepositoryResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TaskRepositoryError {
    TaskRepositoryError::unavailable(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        match tasks.entry(task.id()) {
            Entry::Occupied(_) => Err(TaskRepositoryError::AlreadyExists(task.id())),
            Entry::Vacant(slot) => {
                tracing::debug!(task_id = %task.id(), "stored task in memory");
                Ok(slot.insert(task.clone()).clone())
            }
        }
    }

    async fn get(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let stored = tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        stored.clone_from(task);
        tracing::debug!(task_id = %task.id(), "replaced task in memory");
        Ok(stored.clone())
    }
}
