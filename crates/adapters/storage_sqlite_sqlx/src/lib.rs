//! # adminkit-adapter-storage-sqlite-sqlx
//!
//! `SQLite` database adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `DatabaseAdapter` and `Connection` from `adminkit-app::ports::database`
//! - Manage the `SQLite` connection pool lifecycle
//! - Introspect tables with `PRAGMA table_info`
//! - Build parameterized CRUD statements from a `TableDescriptor` and map rows
//!   to records
//!
//! ## Dependency rule
//! Depends on `adminkit-app` (for port traits) and `adminkit-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod connection;
pub mod error;
pub mod pool;
mod row;
mod sql;

pub use connection::SqliteConnection;
pub use error::StorageError;
pub use pool::SqliteAdapter;
