//! Repository contract checks against `PostgreSQL`.

use super::helpers::item_table;
use crate::test_helpers;
use task_cluster::task::adapters::versioned::VersionedTaskRepository;

#[tokio::test(flavor = "multi_thread")]
async fn versioned_repository_honours_contract() -> Result<(), eyre::Report> {
    let Some(table) = item_table()? else {
        return Ok(());
    };
    let repository = VersionedTaskRepository::new(table);

    test_helpers::created_task_reads_back(&repository).await?;
    test_helpers::unknown_task_reads_as_absent(&repository).await?;
    test_helpers::duplicate_create_is_rejected(&repository).await?;
    test_helpers::update_replaces_stored_task(&repository).await?;
    test_helpers::update_of_unknown_task_is_rejected(&repository).await?;
    Ok(())
}
