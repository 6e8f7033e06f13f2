//! `PostgreSQL` adapter for the versioned item table.

mod models;
mod schema;
mod table;

pub use table::{ItemPgPool, PostgresItemTable};
