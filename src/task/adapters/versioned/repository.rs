//! Task repository over a versioned item table.

use async_trait::async_trait;

use crate::task::{
    domain::{Task, TaskId},
    ports::{
        CompositeKey, RowVersion, TableError, TaskRepository, TaskRepositoryError,
        TaskRepositoryResult, VersionedItem, VersionedItemTable,
    },
};

/// Partition key shared by every task item.
pub const TASK_PARTITION_KEY: &str = "TASK";

/// Prefix of the sort key; the task ID follows it.
pub const TASK_SORT_KEY_PREFIX: &str = "TASK#";

/// Builds the composite key under which a task is stored.
#[must_use]
pub fn task_key(task_id: TaskId) -> CompositeKey {
    CompositeKey::new(
        TASK_PARTITION_KEY,
        format!("{TASK_SORT_KEY_PREFIX}{task_id}"),
    )
}

/// A task together with the version token it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedTask {
    /// Decoded task payload.
    pub task: Task,
    /// Version token required to overwrite this revision.
    pub version: RowVersion,
}

/// Task repository using optimistic concurrency over a [`VersionedItemTable`].
///
/// `update` reads the current item, then writes the successor revision on
/// the condition that the stored version has not moved. A lost race is
/// reported as [`TaskRepositoryError::ConflictRetry`]; this type never
/// retries on its own.
#[derive(Debug, Clone)]
pub struct VersionedTaskRepository<T> {
    table: T,
}

impl<T> VersionedTaskRepository<T>
where
    T: VersionedItemTable,
{
    /// Creates a repository over the given table.
    #[must_use]
    pub const fn new(table: T) -> Self {
        Self { table }
    }

    /// Returns the underlying table.
    #[must_use]
    pub const fn table(&self) -> &T {
        &self.table
    }

    /// Reads a task along with its current version token.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::StorageUnavailable`] when the table
    /// fails or the stored payload cannot be decoded.
    pub async fn get_versioned(&self, id: TaskId) -> TaskRepositoryResult<Option<VersionedTask>> {
        let item = self
            .table
            .get_item(&task_key(id))
            .await
            .map_err(|err| map_table_error(err, id))?;
        item.map(|stored| {
            let version = stored.row_version();
            decode_task(stored).map(|task| VersionedTask { task, version })
        })
        .transpose()
    }

    /// Writes `task` only if the stored revision still carries
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist,
    /// [`TaskRepositoryError::ConflictRetry`] when the stored version differs
    /// from `expected_version`, and
    /// [`TaskRepositoryError::StorageUnavailable`] on table failures.
    pub async fn update_versioned(
        &self,
        task: &Task,
        expected_version: RowVersion,
    ) -> TaskRepositoryResult<VersionedTask> {
        let id = task.id();
        let existing = self.fetch_item(id).await?;
        if existing.row_version() != expected_version {
            tracing::warn!(
                task_id = %id,
                expected = %expected_version,
                stored = %existing.row_version(),
                "task version moved before write"
            );
            return Err(TaskRepositoryError::ConflictRetry(id));
        }
        self.write_revision(task, &existing).await
    }

    async fn fetch_item(&self, id: TaskId) -> TaskRepositoryResult<VersionedItem> {
        self.table
            .get_item(&task_key(id))
            .await
            .map_err(|err| map_table_error(err, id))?
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn write_revision(
        &self,
        task: &Task,
        existing: &VersionedItem,
    ) -> TaskRepositoryResult<VersionedTask> {
        let id = task.id();
        let updated = existing.next_revision(encode_task(task)?, task.updated_at());
        self.table
            .update_item(&updated, existing)
            .await
            .map_err(|err| match err {
                TableError::ConditionalCheckFailed(_) => {
                    tracing::warn!(
                        task_id = %id,
                        version = %existing.row_version(),
                        "conditional task write lost a race"
                    );
                    TaskRepositoryError::ConflictRetry(id)
                }
                other => map_table_error(other, id),
            })?;
        tracing::debug!(task_id = %id, version = %updated.row_version(), "wrote task revision");
        let version = updated.row_version();
        Ok(VersionedTask {
            task: decode_task(updated)?,
            version,
        })
    }
}

#[async_trait]
impl<T> TaskRepository for VersionedTaskRepository<T>
where
    T: VersionedItemTable,
{
    async fn create(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let id = task.id();
        let item = VersionedItem::new(task_key(id), encode_task(task)?, task.created_at());
        self.table.insert_item(&item).await.map_err(|err| match err {
            TableError::ConditionalCheckFailed(_) => TaskRepositoryError::AlreadyExists(id),
            other => map_table_error(other, id),
        })?;
        tracing::debug!(task_id = %id, version = %item.row_version(), "inserted task item");
        decode_task(item)
    }

    async fn get(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.get_versioned(id).await?.map(|versioned| versioned.task))
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<Task> {
        let existing = self.fetch_item(task.id()).await?;
        Ok(self.write_revision(task, &existing).await?.task)
    }
}

fn encode_task(task: &Task) -> TaskRepositoryResult<serde_json::Value> {
    serde_json::to_value(task).map_err(TaskRepositoryError::unavailable)
}

fn decode_task(item: VersionedItem) -> TaskRepositoryResult<Task> {
    serde_json::from_value(item.into_row_value()).map_err(TaskRepositoryError::unavailable)
}

fn map_table_error(err: TableError, id: TaskId) -> TaskRepositoryError {
    match err {
        TableError::ConditionalCheckFailed(_) => TaskRepositoryError::ConflictRetry(id),
        other => {
            tracing::warn!(task_id = %id, error = %other, "item table failure");
            TaskRepositoryError::unavailable(other)
        }
    }
}
