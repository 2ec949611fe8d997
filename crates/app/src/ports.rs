//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engine core and the swappable
//! adapters. They are defined here (in `app`) so that both the engine and
//! the adapter crates can depend on them without creating circular
//! dependencies.

pub mod database;
pub mod generator;
pub mod page;
pub mod router;
pub mod theme;

pub use database::{Connection, DatabaseAdapter, DatabaseError};
pub use generator::{GeneratorError, TableGenerator};
pub use page::{Page, PageContext, PageError, PageHandler, StaticPage};
pub use router::{HttpApp, InstallContext, RouterAdapter, RouterError};
pub use theme::{ThemeAdapter, ThemeError};
