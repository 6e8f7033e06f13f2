//! Port contracts for task storage.
//!
//! Ports define infrastructure-agnostic interfaces used by task services and
//! by the versioned repository adapter.

pub mod repository;
pub mod table;

pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use table::{
    CompositeKey, RowVersion, TableError, TableResult, VersionedItem, VersionedItemTable,
};
