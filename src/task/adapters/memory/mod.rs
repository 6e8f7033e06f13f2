//! In-memory adapters for task storage.

mod table;
mod task;

pub use table::InMemoryItemTable;
pub use task::InMemoryTaskRepository;
