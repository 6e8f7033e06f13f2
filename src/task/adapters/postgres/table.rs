//! `PostgreSQL` implementation of the versioned item table.

use super::{
    models::{ItemRow, NewItemRow},
    schema::task_items,
};
use crate::task::ports::{
    CompositeKey, RowVersion, TableError, TableResult, VersionedItem, VersionedItemTable,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the item table.
pub type ItemPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed versioned item table.
///
/// Inserts rely on the `(partition_key, sort_key)` primary key; updates are a
/// single `UPDATE ... WHERE row_version = $expected` so the compare and the
/// swap happen in one statement.
#[derive(Debug, Clone)]
pub struct PostgresItemTable {
    pool: ItemPgPool,
}

impl PostgresItemTable {
    /// Creates a table from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ItemPgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Unavailable`] when the pool cannot be built.
    pub fn connect(database_url: &str, max_size: u32) -> TableResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(TableError::unavailable)?;
        Ok(Self::new(pool))
    }

    async fn run_blocking<F, T>(&self, f: F) -> TableResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TableResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TableError::unavailable)?;
            f(&mut connection)
        })
        .await
        .map_err(TableError::unavailable)?
    }
}

#[async_trait]
impl VersionedItemTable for PostgresItemTable {
    async fn insert_item(&self, item: &VersionedItem) -> TableResult<()> {
        let key = item.key().clone();
        let new_row = to_new_row(item)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(task_items::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TableError::ConditionalCheckFailed(key.clone())
                    }
                    _ => TableError::unavailable(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn get_item(&self, key: &CompositeKey) -> TableResult<Option<VersionedItem>> {
        let lookup = key.clone();
        self.run_blocking(move |connection| {
            let row = task_items::table
                .filter(task_items::partition_key.eq(lookup.partition_key()))
                .filter(task_items::sort_key.eq(lookup.sort_key()))
                .select(ItemRow::as_select())
                .first::<ItemRow>(connection)
                .optional()
                .map_err(TableError::unavailable)?;
            row.map(row_to_item).transpose()
        })
        .await
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

        let key = existing_item.key().clone();
        let expected_version = to_db_version(existing_item.row_version())?;
        let next_version = to_db_version(new_item.row_version())?;
        let row_value = new_item.row_value().clone();
        let last_updated_at = new_item.last_updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                task_items::table
                    .filter(task_items::partition_key.eq(key.partition_key()))
                    .filter(task_items::sort_key.eq(key.sort_key()))
                    .filter(task_items::row_version.eq(expected_version)),
            )
            .set((
                task_items::row_version.eq(next_version),
                task_items::row_value.eq(&row_value),
                task_items::last_updated_at.eq(last_updated_at),
            ))
            .execute(connection)
            .map_err(TableError::unavailable)?;

            if affected == 0 {
                return Err(TableError::ConditionalCheckFailed(key.clone()));
            }
            Ok(())
        })
        .await
    }
}

fn to_db_version(version: RowVersion) -> TableResult<i64> {
    i64::try_from(version.value()).map_err(TableError::unavailable)
}

fn to_new_row(item: &VersionedItem) -> TableResult<NewItemRow> {
    Ok(NewItemRow {
        partition_key: item.key().partition_key().to_owned(),
        sort_key: item.key().sort_key().to_owned(),
        row_version: to_db_version(item.row_version())?,
        row_value: item.row_value().clone(),
        created_at: item.created_at(),
        last_updated_at: item.last_updated_at(),
    })
}

fn row_to_item(row: ItemRow) -> TableResult<VersionedItem> {
    let ItemRow {
        partition_key,
        sort_key,
        row_version,
        row_value,
        created_at,
        last_updated_at,
    } = row;

    let version = u64::try_from(row_version).map_err(TableError::unavailable)?;
    Ok(VersionedItem::from_persisted(
        CompositeKey::new(partition_key, sort_key),
        RowVersion::from_raw(version),
        created_at,
        last_updated_at,
        row_value,
    ))
}
