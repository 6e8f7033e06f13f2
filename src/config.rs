//! Environment configuration and storage backend selection.
//!
//! Configuration is read once at startup. Values come from the process
//! environment, after an optional `.env` file has been loaded:
//!
//! - `TASK_CLUSTER_STORAGE`: `memory` (default), `versioned-memory`, or
//!   `postgres`
//! - `TASK_CLUSTER_DATABASE_URL`: connection string, required for `postgres`
//! - `TASK_CLUSTER_DB_POOL_SIZE`: connection pool size (default 8)
//! - `TASK_CLUSTER_LOG`: tracing filter directive (default `info`)

use crate::task::{
    adapters::{
        memory::{InMemoryItemTable, InMemoryTaskRepository},
        versioned::VersionedTaskRepository,
    },
    ports::{TableError, TaskRepository},
};
use std::sync::Arc;
use thiserror::Error;

/// Variable selecting the storage backend.
pub const STORAGE_VAR: &str = "TASK_CLUSTER_STORAGE";
/// Variable holding the `PostgreSQL` connection string.
pub const DATABASE_URL_VAR: &str = "TASK_CLUSTER_DATABASE_URL";
/// Variable holding the connection pool size.
pub const POOL_SIZE_VAR: &str = "TASK_CLUSTER_DB_POOL_SIZE";
/// Variable holding the tracing filter directive.
pub const LOG_FILTER_VAR: &str = "TASK_CLUSTER_LOG";

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while loading configuration or building the backend.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    /// A variable is set to an unusable value.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// The `.env` file exists but could not be read.
    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    /// The selected backend was not compiled into this build.
    #[error("storage backend {0} requires the `{0}` cargo feature")]
    BackendNotCompiled(&'static str),

    /// The backend could not be initialised.
    #[error(transparent)]
    Storage(#[from] TableError),
}

/// Storage backend selection with its connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map guarded by a read-write lock.
    Memory,
    /// Versioned repository over a process-local item table.
    VersionedMemory,
    /// Versioned repository over a `PostgreSQL` item table.
    Postgres {
        /// Connection string.
        database_url: String,
        /// Maximum pooled connections.
        pool_size: u32,
    },
}

/// Process configuration for the task core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskClusterConfig {
    /// Selected storage backend.
    pub storage: StorageBackend,
    /// Tracing filter directive.
    pub log_filter: String,
}

impl Default for TaskClusterConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
        }
    }
}

impl TaskClusterConfig {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DotEnv`] when `.env` exists but is malformed,
    /// and the errors of [`TaskClusterConfig::from_lookup`] otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown backend name or a
    /// non-positive pool size, and [`ConfigError::MissingVar`] when
    /// `postgres` is selected without a database URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_filter = lookup(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());
        let backend_name = lookup(STORAGE_VAR).unwrap_or_else(|| "memory".to_owned());

        let storage = match backend_name.trim().to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "versioned-memory" => StorageBackend::VersionedMemory,
            "postgres" => {
                let database_url =
                    lookup(DATABASE_URL_VAR).ok_or(ConfigError::MissingVar(DATABASE_URL_VAR))?;
                let pool_size = lookup(POOL_SIZE_VAR)
                    .map(|raw| parse_pool_size(&raw))
                    .transpose()?
                    .unwrap_or(DEFAULT_POOL_SIZE);
                StorageBackend::Postgres {
                    database_url,
                    pool_size,
                }
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: STORAGE_VAR,
                    value: backend_name,
                    reason: "expected memory, versioned-memory, or postgres",
                });
            }
        };

        Ok(Self {
            storage,
            log_filter,
        })
    }
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidValue {
            key: POOL_SIZE_VAR,
            value: raw.to_owned(),
            reason: "expected a positive integer",
        }),
    }
}

/// Builds the configured repository for injection into the service.
///
/// # Errors
///
/// Returns [`ConfigError::BackendNotCompiled`] when `postgres` is selected in
/// a build without the `postgres` feature, or [`ConfigError::Storage`] when
/// the connection pool cannot be created.
pub fn build_repository(
    config: &TaskClusterConfig,
) -> Result<Arc<dyn TaskRepository>, ConfigError> {
    match &config.storage {
        StorageBackend::Memory => {
            tracing::info!("using in-memory task repository");
            Ok(Arc::new(InMemoryTaskRepository::new()))
        }
        StorageBackend::VersionedMemory => {
            tracing::info!("using versioned repository over in-memory item table");
            Ok(Arc::new(VersionedTaskRepository::new(
                InMemoryItemTable::new(),
            )))
        }
        StorageBackend::Postgres {
            database_url,
            pool_size,
        } => build_postgres_repository(database_url, *pool_size),
    }
}

#[cfg(feature = "postgres")]
fn build_postgres_repository(
    database_url: &str,
    pool_size: u32,
) -> Result<Arc<dyn TaskRepository>, ConfigError> {
    use crate::task::adapters::postgres::PostgresItemTable;

    let table = PostgresItemTable::connect(database_url, pool_size)?;
    tracing::info!(pool_size, "using versioned repository over PostgreSQL");
    Ok(Arc::new(VersionedTaskRepository::new(table)))
}

#[cfg(not(feature = "postgres"))]
fn build_postgres_repository(
    _database_url: &str,
    _pool_size: u32,
) -> Result<Arc<dyn TaskRepository>, ConfigError> {
    Err(ConfigError::BackendNotCompiled("postgres"))
}
