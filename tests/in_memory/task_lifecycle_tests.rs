//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::rstest;
use task_cluster::{
    config::{StorageBackend, TaskClusterConfig, build_repository},
    task::{
        domain::TaskStatus,
        ports::TaskRepository,
        services::{CreateTaskRequest, TaskErrorKind, TaskLifecycleService},
    },
};

type TestService = TaskLifecycleService<dyn TaskRepository, DefaultClock>;

fn service(storage: StorageBackend) -> Result<TestService, eyre::Report> {
    let config = TaskClusterConfig {
        storage,
        ..TaskClusterConfig::default()
    };
    let repository = build_repository(&config)?;
    Ok(TaskLifecycleService::new(repository, Arc::new(DefaultClock)))
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::versioned(StorageBackend::VersionedMemory)]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_isolated_from_each_other(
    #[case] storage: StorageBackend,
) -> Result<(), eyre::Report> {
    let service = service(storage)?;
    let first = service.create(CreateTaskRequest::new("First", 2)).await?;
    let second = service.create(CreateTaskRequest::new("Second", 8)).await?;

    service.cancel(first.id()).await?;
    service.change_priority(second.id(), 1).await?;

    let first_now = service
        .get(first.id())
        .await?
        .ok_or_else(|| eyre::eyre!("first task missing"))?;
    let second_now = service
        .get(second.id())
        .await?
        .ok_or_else(|| eyre::eyre!("second task missing"))?;
    eyre::ensure!(first_now.status() == TaskStatus::Cancelled);
    eyre::ensure!(first_now.priority().value() == 2);
    eyre::ensure!(second_now.status() == TaskStatus::Pending);
    eyre::ensure!(second_now.priority().value() == 1);
    Ok(())
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::versioned(StorageBackend::VersionedMemory)]
#[tokio::test(flavor = "multi_thread")]
async fn cancelled_task_stays_cancelled(
    #[case] storage: StorageBackend,
) -> Result<(), eyre::Report> {
    let service = service(storage)?;
    let task = service.create(CreateTaskRequest::new("Once", 5)).await?;
    service.cancel(task.id()).await?;

    let err = service
        .cancel(task.id())
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("second cancel must fail"))?;

    eyre::ensure!(err.kind() == TaskErrorKind::InvalidTransition);
    Ok(())
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::versioned(StorageBackend::VersionedMemory)]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_priority_changes_leave_a_valid_task(
    #[case] storage: StorageBackend,
) -> Result<(), eyre::Report> {
    let service = Arc::new(service(storage)?);
    let task = service.create(CreateTaskRequest::new("Contended", 5)).await?;

    let handles: Vec<_> = (1..=10)
        .map(|priority| {
            let service = Arc::clone(&service);
            let id = task.id();
            tokio::spawn(async move { service.change_priority(id, priority).await })
        })
        .collect();
    for handle in handles {
        match handle.await? {
            Ok(_) => {}
            Err(err) => eyre::ensure!(
                err.kind() == TaskErrorKind::ConflictRetry,
                "unexpected failure {err}"
            ),
        }
    }

    let stored = service
        .get(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task missing"))?;
    eyre::ensure!((1..=10).contains(&stored.priority().value()));
    eyre::ensure!(stored.status() == TaskStatus::Pending);
    Ok(())
}
