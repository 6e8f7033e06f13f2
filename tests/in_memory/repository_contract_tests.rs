//! Repository contract checks run against both in-process backends.

use std::sync::Arc;

use crate::test_helpers;
use rstest::rstest;
use task_cluster::{
    config::{StorageBackend, TaskClusterConfig, build_repository},
    task::ports::TaskRepository,
};

fn repository(storage: StorageBackend) -> Result<Arc<dyn TaskRepository>, eyre::Report> {
    let config = TaskClusterConfig {
        storage,
        ..TaskClusterConfig::default()
    };
    Ok(build_repository(&config)?)
}

#[rstest]
#[case::memory(StorageBackend::Memory)]
#[case::versioned(StorageBackend::VersionedMemory)]
#[tokio::test(flavor = "multi_thread")]
async fn repository_honours_contract(#[case] storage: StorageBackend) -> Result<(), eyre::Report> {
    let repository = repository(storage)?;

    test_helpers::created_task_reads_back(repository.as_ref()).await?;
    test_helpers::unknown_task_reads_as_absent(repository.as_ref()).await?;
    test_helpers::duplicate_create_is_rejected(repository.as_ref()).await?;
    test_helpers::update_replaces_stored_task(repository.as_ref()).await?;
    test_helpers::update_of_unknown_task_is_rejected(repository.as_ref()).await?;
    Ok(())
}
