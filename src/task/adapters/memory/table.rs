//! In-memory versioned item table.

use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use crate::task::ports::{CompositeKey, TableError, TableResult, VersionedItem, VersionedItemTable};

/// Process-local stand-in for a networked versioned table.
///
/// Conditions are evaluated under the write lock, so each conditional write
/// is atomic in the same way a single remote call would be.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemTable {
    items: Arc<RwLock<HashMap<CompositeKey, VersionedItem>>>,
}

impl InMemoryItemTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored items.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Unavailable`] when the lock is poisoned.
    pub fn len(&self) -> TableResult<usize> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.len())
    }

    /// Returns whether the table holds no items.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Unavailable`] when the lock is poisoned.
    pub fn is_empty(&self) -> TableResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> TableError {
    TableError::unavailable(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl VersionedItemTable for InMemoryItemTable {
    async fn insert_item(&self, item: &VersionedItem) -> TableResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        match items.entry(item.key().clone()) {
            Entry::Occupied(occupied) => {
                Err(TableError::ConditionalCheckFailed(occupied.key().clone()))
            }
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                Ok(())
            }
        }
    }

    async fn get_item(&self, key: &CompositeKey) -> TableResult<Option<VersionedItem>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    async fn update_item(
        &self,
        new_item: &VersionedItem,
        existing_item: &VersionedItem,
    ) -> TableResult<()> {
        if new_item.key() != existing_item.key() {
            return Err(TableError::KeyMismatch {
                existing: existing_item.key().clone(),
                new: new_item.key().clone(),
            });
        }

        let mut items = self.items.write().map_err(poisoned)?;
        match items.get_mut(existing_item.key()) {
            Some(stored) if stored.row_version() == existing_item.row_version() => {
                stored.clone_from(new_item);
                Ok(())
            }
            _ => Err(TableError::ConditionalCheckFailed(
                existing_item.key().clone(),
            )),
        }
    }
}
