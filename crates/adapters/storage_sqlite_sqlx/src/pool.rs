//! `SQLite` database adapter: turns a DSN into a pooled [`SqliteConnection`].

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use adminkit_app::ports::{Connection, DatabaseAdapter, DatabaseError};

use crate::connection::SqliteConnection;
use crate::error::StorageError;

/// Name under which the daemon registers this adapter.
pub const DRIVER: &str = "sqlite";

/// Opens `SQLite` databases.
///
/// The DSN is either a `sqlite:` URL (`sqlite::memory:`,
/// `sqlite://data/admin.db?mode=rwc`) or a plain file path. Missing database
/// files are created.
#[derive(Debug, Clone)]
pub struct SqliteAdapter {
    max_connections: u32,
}

impl Default for SqliteAdapter {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

impl SqliteAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound of the pool size for file databases.
    #[must_use]
    pub fn max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }

    /// Connect to `dsn` and verify the connection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the DSN is malformed or the database
    /// cannot be opened.
    pub async fn connect(&self, dsn: &str) -> Result<SqliteConnection, StorageError> {
        let options = connect_options(dsn)?;
        let in_memory = is_memory(dsn);

        // Every in-memory connection is a distinct database, so the pool
        // holds exactly one that never expires.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(self.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        tracing::debug!(%dsn, in_memory, "sqlite pool ready");
        Ok(SqliteConnection::new(pool))
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
    async fn open(&self, dsn: &str) -> Result<Arc<dyn Connection>, DatabaseError> {
        let connection = self.connect(dsn).await?;
        Ok(Arc::new(connection))
    }
}

fn connect_options(dsn: &str) -> Result<SqliteConnectOptions, StorageError> {
    let options = if dsn.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(dsn)?
    } else {
        SqliteConnectOptions::new().filename(dsn)
    };
    Ok(options.create_if_missing(true).foreign_keys(true))
}

fn is_memory(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}
