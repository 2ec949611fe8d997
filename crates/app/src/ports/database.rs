//! Database port — the driver adapter and the live connection it opens.

use std::sync::Arc;

use async_trait::async_trait;

use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::record::Record;

/// Errors surfaced by a database adapter or connection.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// The connection was already closed.
    #[error("connection is closed")]
    Closed,

    /// No row matches the requested id.
    #[error("record not found")]
    NotFound,

    /// A uniqueness, foreign-key or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Any other driver failure.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Column metadata reported by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared SQL type, as written in the schema (may be empty).
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub has_default: bool,
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Parameters of a list page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Substring matched against the table's searchable fields.
    pub search: Option<String>,
    /// Sortable field name and direction; primary key ascending when absent.
    pub sort: Option<(String, SortOrder)>,
    /// 1-based page number.
    pub page: u32,
    /// `None` returns every matching row.
    pub per_page: Option<u32>,
}

impl ListQuery {
    /// First page of `per_page` rows, unsorted and unfiltered.
    #[must_use]
    pub fn first_page(per_page: u32) -> Self {
        Self {
            search: None,
            sort: None,
            page: 1,
            per_page: Some(per_page),
        }
    }

    /// Every row, used for exports.
    #[must_use]
    pub fn all() -> Self {
        Self {
            search: None,
            sort: None,
            page: 1,
            per_page: None,
        }
    }

    /// Row offset of the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.per_page
            .map_or(0, |per_page| u64::from(self.page.max(1) - 1) * u64::from(per_page))
    }
}

/// One page of records plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPage {
    pub records: Vec<Record>,
    pub total: u64,
    pub page: u32,
    pub per_page: Option<u32>,
}

impl RecordPage {
    /// Number of pages needed to show every match (at least one).
    #[must_use]
    pub fn page_count(&self) -> u32 {
        match self.per_page {
            Some(per_page) if per_page > 0 => {
                let pages = self.total.div_ceil(u64::from(per_page)).max(1);
                u32::try_from(pages).unwrap_or(u32::MAX)
            }
            _ => 1,
        }
    }
}

/// A live database handle.
///
/// Shared read-only by every generator during startup and by every request
/// handler afterwards; implementations handle their own internal locking.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Driver name that opened this connection (e.g. `"sqlite"`).
    fn driver(&self) -> &str;

    /// Round-trip to the database.
    async fn ping(&self) -> Result<(), DatabaseError>;

    /// Describe the columns of `table`; an empty list means the table does not exist.
    async fn describe(&self, table: &str) -> Result<Vec<ColumnInfo>, DatabaseError>;

    /// Fetch one page of `table` matching `query`.
    async fn list(
        &self,
        table: &TableDescriptor,
        query: &ListQuery,
    ) -> Result<RecordPage, DatabaseError>;

    /// Fetch one record by primary key.
    async fn fetch(
        &self,
        table: &TableDescriptor,
        id: &str,
    ) -> Result<Option<Record>, DatabaseError>;

    /// Insert a record and return its primary key.
    async fn insert(&self, table: &TableDescriptor, record: &Record)
    -> Result<String, DatabaseError>;

    /// Update the record with primary key `id`.
    async fn update(
        &self,
        table: &TableDescriptor,
        id: &str,
        record: &Record,
    ) -> Result<(), DatabaseError>;

    /// Delete the record with primary key `id`.
    async fn delete(&self, table: &TableDescriptor, id: &str) -> Result<(), DatabaseError>;

    /// Count every row of `table`.
    async fn count(&self, table: &TableDescriptor) -> Result<u64, DatabaseError>;

    /// Release the underlying resources. Calling it again is a no-op.
    async fn close(&self);

    fn is_closed(&self) -> bool;
}

/// A database driver selected by name from the configuration.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    /// Open a connection to `dsn`.
    async fn open(&self, dsn: &str) -> Result<Arc<dyn Connection>, DatabaseError>;

    /// Adapter-specific cleanup, run once after the connection is closed.
    async fn teardown(&self) {}
}
