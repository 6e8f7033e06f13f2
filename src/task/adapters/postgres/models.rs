//! Diesel row models for versioned task items.

use super::schema::task_items;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for item records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemRow {
    /// Entity class discriminator.
    pub partition_key: String,
    /// Item key within the partition.
    pub sort_key: String,
    /// Revision counter.
    pub row_version: i64,
    /// Item payload.
    pub row_value: Value,
    /// Item creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Item latest write timestamp.
    pub last_updated_at: DateTime<Utc>,
}

/// Insert model for item records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_items)]
pub struct NewItemRow {
    /// Entity class discriminator.
    pub partition_key: String,
    /// Item key within the partition.
    pub sort_key: String,
    /// Revision counter.
    pub row_version: i64,
    /// Item payload.
    pub row_value: Value,
    /// Item creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Item latest write timestamp.
    pub last_updated_at: DateTime<Utc>,
}
