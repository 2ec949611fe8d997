//! `SQLite` implementation of the [`Connection`] port.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use adminkit_app::ports::database::{ColumnInfo, ListQuery, RecordPage};
use adminkit_app::ports::{Connection, DatabaseError};
use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::record::{Record, display_value};

use crate::error::StorageError;
use crate::pool::DRIVER;
use crate::row::{cell, prepare, to_record};
use crate::sql;

/// A pooled `SQLite` database.
pub struct SqliteConnection {
    pool: SqlitePool,
    closed: AtomicBool,
}

impl SqliteConnection {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            closed: AtomicBool::new(false),
        }
    }

    /// Borrow the underlying connection pool, e.g. to run application queries.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn ensure_open(&self) -> Result<(), DatabaseError> {
        if self.is_closed() {
            Err(DatabaseError::Closed)
        } else {
            Ok(())
        }
    }

    async fn count_matching(
        &self,
        table: &TableDescriptor,
        search: Option<&str>,
    ) -> Result<u64, StorageError> {
        let statement = sql::count_matching(table, search);
        let total: i64 = prepare(&statement)?
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    fn driver(&self) -> &str {
        DRIVER
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.ensure_open()?;
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
        self.ensure_open()?;
        let rows = sqlx::query(&sql::table_info(table))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        let columns = rows
            .iter()
            .map(|row| -> Result<ColumnInfo, sqlx::Error> {
                let default: Option<String> = row.try_get("dflt_value")?;
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    sql_type: row.try_get("type")?,
                    not_null: row.try_get::<i64, _>("notnull")? != 0,
                    primary_key: row.try_get::<i64, _>("pk")? != 0,
                    has_default: default.is_some(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;
        Ok(columns)
    }

    async fn list(
        &self,
        table: &TableDescriptor,
        query: &ListQuery,
    ) -> Result<RecordPage, DatabaseError> {
        self.ensure_open()?;
        let statement = sql::list(table, query);
        let rows = prepare(&statement)?
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let records = rows
            .iter()
            .map(|row| to_record(row, table))
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;
        let total = self.count_matching(table, query.search.as_deref()).await?;

        Ok(RecordPage {
            records,
            total,
            page: query.page.max(1),
            per_page: query.per_page,
        })
    }

    async fn fetch(
        &self,
        table: &TableDescriptor,
        id: &str,
    ) -> Result<Option<Record>, DatabaseError> {
        self.ensure_open()?;
        let statement = sql::select_by_id(table, id);
        let row = prepare(&statement)?
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let record = row
            .map(|row| to_record(&row, table))
            .transpose()
            .map_err(StorageError::from)?;
        Ok(record)
    }

    async fn insert(
        &self,
        table: &TableDescriptor,
        record: &Record,
    ) -> Result<String, DatabaseError> {
        self.ensure_open()?;
        let statement = sql::insert(table, record);
        let row = prepare(&statement)?
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::from)?;
        let field_type = table.field(&table.primary_key).map(|f| f.field_type);
        let id = cell(&row, 0, field_type).map_err(StorageError::from)?;
        Ok(display_value(&id))
    }

    async fn update(
        &self,
        table: &TableDescriptor,
        id: &str,
        record: &Record,
    ) -> Result<(), DatabaseError> {
        self.ensure_open()?;
        let Some(statement) = sql::update(table, id, record) else {
            return match self.fetch(table, id).await? {
                Some(_) => Ok(()),
                None => Err(DatabaseError::NotFound),
            };
        };
        let result = prepare(&statement)?
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, table: &TableDescriptor, id: &str) -> Result<(), DatabaseError> {
        self.ensure_open()?;
        let statement = sql::delete(table, id);
        let result = prepare(&statement)?
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound);
        }
        Ok(())
    }

    async fn count(&self, table: &TableDescriptor) -> Result<u64, DatabaseError> {
        self.ensure_open()?;
        Ok(self.count_matching(table, None).await?)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.pool.close().await;
        tracing::debug!("sqlite pool closed");
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
