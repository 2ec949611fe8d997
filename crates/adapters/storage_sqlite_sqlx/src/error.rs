//! Storage-specific error type wrapping sqlx errors.

use adminkit_app::ports::DatabaseError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// A value cannot be bound to a statement parameter.
    #[error("unsupported value for column {0:?}")]
    Unsupported(String),
}

impl From<StorageError> for DatabaseError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Database(sqlx::Error::PoolClosed) => Self::Closed,
            StorageError::Database(sqlx::Error::RowNotFound) => Self::NotFound,
            StorageError::Database(sqlx::Error::Database(db))
                if !matches!(db.kind(), sqlx::error::ErrorKind::Other) =>
            {
                Self::Constraint(db.message().to_string())
            }
            other => Self::Storage(Box::new(other)),
        }
    }
}
