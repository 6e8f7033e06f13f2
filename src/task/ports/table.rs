//! Port for a composite-key item table with per-item version tokens.
//!
//! The table stores opaque JSON payloads. Every write is conditional:
//! inserts require the key to be absent and updates require the stored
//! version to still match the version the caller read. The table never
//! retries; a failed condition is reported to the caller.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for item table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Partition and sort key addressing a single item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    partition_key: String,
    sort_key: String,
}

impl CompositeKey {
    /// Creates a composite key.
    #[must_use]
    pub fn new(partition_key: impl Into<String>, sort_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        }
    }

    /// Returns the partition key.
    #[must_use]
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    /// Returns the sort key.
    #[must_use]
    pub fn sort_key(&self) -> &str {
        &self.sort_key
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition_key, self.sort_key)
    }
}

/// Store-managed revision token of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowVersion(u64);

impl RowVersion {
    /// Version assigned to a freshly inserted item.
    #[must_use]
    pub const fn initial() -> Self {
        Self(1)
    }

    /// Wraps a raw version read back from storage.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the version following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for RowVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stored item: key, version token, item timestamps, and JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedItem {
    key: CompositeKey,
    row_version: RowVersion,
    created_at: DateTime<Utc>,
    last_updated_at: DateTime<Utc>,
    row_value: Value,
}

impl VersionedItem {
    /// Creates a first-revision item.
    #[must_use]
    pub const fn new(key: CompositeKey, row_value: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            key,
            row_version: RowVersion::initial(),
            created_at: timestamp,
            last_updated_at: timestamp,
            row_value,
        }
    }

    /// Reconstructs an item read back from storage.
    #[must_use]
    pub const fn from_persisted(
        key: CompositeKey,
        row_version: RowVersion,
        created_at: DateTime<Utc>,
        last_updated_at: DateTime<Utc>,
        row_value: Value,
    ) -> Self {
        Self {
            key,
            row_version,
            created_at,
            last_updated_at,
            row_value,
        }
    }

    /// Builds the successor revision carrying a new payload.
    #[must_use]
    pub fn next_revision(&self, row_value: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            key: self.key.clone(),
            row_version: self.row_version.next(),
            created_at: self.created_at,
            last_updated_at: timestamp.max(self.created_at),
            row_value,
        }
    }

    /// Returns the item key.
    #[must_use]
    pub const fn key(&self) -> &CompositeKey {
        &self.key
    }

    /// Returns the version token.
    #[must_use]
    pub const fn row_version(&self) -> RowVersion {
        self.row_version
    }

    /// Returns the item creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the item's latest write timestamp.
    #[must_use]
    pub const fn last_updated_at(&self) -> DateTime<Utc> {
        self.last_updated_at
    }

    /// Returns the JSON payload.
    #[must_use]
    pub const fn row_value(&self) -> &Value {
        &self.row_value
    }

    /// Consumes the item and returns its payload.
    #[must_use]
    pub fn into_row_value(self) -> Value {
        self.row_value
    }
}

/// Composite-key table with conditional writes.
#[async_trait]
pub trait VersionedItemTable: Send + Sync {
    /// Inserts an item if no item with the same key exists.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ConditionalCheckFailed`] when the key is taken.
    async fn insert_item(&self, item: &VersionedItem) -> TableResult<()>;

    /// Reads the current revision of an item.
    ///
    /// Returns `None` when the key is absent.
    async fn get_item(&self, key: &CompositeKey) -> TableResult<Option<VersionedItem>>;

    /// Replaces `existing_item` with `new_item` if the stored version still
    /// equals `existing_item`'s version.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ConditionalCheckFailed`] when the item is gone
    /// or its version moved on, and [`TableError::KeyMismatch`] when the two
    /// items address different keys.
    async fn update_item(
        &self,
        new_item: &VersionedItem,
        existing_item: &VersionedItem,
    ) -> TableResult<()>;
}

/// Errors returned by item table implementations.
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// The write precondition did not hold at write time.
    #[error("conditional check failed for item {0}")]
    ConditionalCheckFailed(CompositeKey),

    /// An update tried to replace an item with one stored under another key.
    #[error("item key mismatch: {existing} cannot be replaced by {new}")]
    KeyMismatch {
        /// Key of the item read from the table.
        existing: CompositeKey,
        /// Key of the replacement item.
        new: CompositeKey,
    },

    /// The table could not be reached.
    #[error("item table unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TableError {
    /// Wraps a backend failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
