//! Conditional write tests for the `PostgreSQL` item table.

use super::helpers::item_table;
use chrono::Utc;
use serde_json::json;
use task_cluster::task::{
    domain::TaskId,
    ports::{CompositeKey, RowVersion, TableError, VersionedItem, VersionedItemTable},
};

fn fresh_key() -> CompositeKey {
    CompositeKey::new("TASK", format!("TASK#{}", TaskId::new()))
}

#[tokio::test(flavor = "multi_thread")]
async fn insert_is_conditional_on_absent_key() -> Result<(), eyre::Report> {
    let Some(table) = item_table()? else {
        return Ok(());
    };
    let item = VersionedItem::new(fresh_key(), json!({ "title": "first" }), Utc::now());
    table.insert_item(&item).await?;

    let result = table.insert_item(&item).await;

    eyre::ensure!(
        matches!(result, Err(TableError::ConditionalCheckFailed(_))),
        "expected ConditionalCheckFailed, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn update_requires_matching_version() -> Result<(), eyre::Report> {
    let Some(table) = item_table()? else {
        return Ok(());
    };
    let original = VersionedItem::new(fresh_key(), json!({ "n": 1 }), Utc::now());
    table.insert_item(&original).await?;
    let second = original.next_revision(json!({ "n": 2 }), Utc::now());
    table.update_item(&second, &original).await?;

    let stale = original.next_revision(json!({ "n": 3 }), Utc::now());
    let result = table.update_item(&stale, &original).await;

    eyre::ensure!(
        matches!(result, Err(TableError::ConditionalCheckFailed(_))),
        "expected ConditionalCheckFailed, got {result:?}"
    );
    let stored = table
        .get_item(original.key())
        .await?
        .ok_or_else(|| eyre::eyre!("item missing"))?;
    eyre::ensure!(stored.row_version() == RowVersion::from_raw(2));
    eyre::ensure!(stored.row_value() == &json!({ "n": 2 }));
    eyre::ensure!(stored.created_at() <= stored.last_updated_at());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_item_reads_as_absent() -> Result<(), eyre::Report> {
    let Some(table) = item_table()? else {
        return Ok(());
    };
    let fetched = table.get_item(&fresh_key()).await?;
    eyre::ensure!(fetched.is_none(), "expected no item, got {fetched:?}");
    Ok(())
}
