//! # adminkit-app
//!
//! Engine core — turns a configuration, a set of adapters and a set of table
//! generators into a running admin surface.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `DatabaseAdapter` / `Connection` — open a connection, introspect, CRUD
//!   - `RouterAdapter` / `HttpApp` — install a route plan, serve it
//!   - `ThemeAdapter` — render admin views to HTML
//!   - `TableGenerator` — produce a `TableDescriptor` for a model name
//!   - `PageHandler` — operator-supplied custom pages
//! - Load and validate the configuration (`config`)
//! - Keep named adapters (`registry`) and named generators (`generators`)
//! - Plan every route and reject conflicts before installation (`routes`)
//! - Orchestrate the build phases and the running period (`engine`, `lifecycle`)
//!
//! ## Dependency rule
//! Depends on `adminkit-domain` only (plus `tokio` for the listener and
//! shutdown plumbing). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod config;
pub mod engine;
pub mod error;
pub mod generators;
pub mod lifecycle;
pub mod ports;
pub mod registry;
pub mod routes;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigError};
pub use engine::{Engine, EngineBuilder, RunningEngine};
pub use error::EngineError;
pub use generators::GeneratorRegistry;
pub use lifecycle::LifecycleState;
pub use registry::{AdapterRegistry, DuplicatePolicy};
