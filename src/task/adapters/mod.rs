//! Adapter implementations for task ports.
//!
//! - [`memory`]: process-local repository and item table
//! - [`versioned`]: optimistic-concurrency repository over any item table
//! - `postgres`: Diesel-backed item table (cargo feature `postgres`)
//! - [`api`]: transport-agnostic command layer with JSON bodies

pub mod api;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod versioned;
