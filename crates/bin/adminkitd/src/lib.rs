//! # adminkitd — adminkit daemon
//!
//! Composition root that wires the bundled adapters into the engine.
//!
//! ## Responsibilities
//! - Register the bundled adapters under their configuration names
//!   (`sqlite`, `axum`, `plain`)
//! - Register one schema-introspecting generator per configured table
//! - Add the dashboard page at the admin prefix
//! - Build the engine; `main` starts it and waits for an interrupt
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no engine logic belongs here.

pub mod pages;
pub mod tables;

use std::sync::Arc;

use adminkit_adapter_http_axum::{AxumRouter, ROUTER_NAME};
use adminkit_adapter_storage_sqlite_sqlx::SqliteAdapter;
use adminkit_adapter_storage_sqlite_sqlx::pool::DRIVER;
use adminkit_adapter_theme_askama::{PlainTheme, THEME_NAME};
use adminkit_app::ports::TableGenerator;
use adminkit_app::routes::CustomRoute;
use adminkit_app::{AdapterRegistry, Config, Engine, EngineError, GeneratorRegistry};

use crate::pages::DashboardPage;
use crate::tables::SchemaGenerator;

/// Registry holding every bundled adapter.
///
/// # Errors
///
/// Returns [`EngineError::DuplicateAdapter`] only if two bundled adapters
/// share a name under a rejecting policy.
pub fn adapter_registry(config: &Config) -> Result<AdapterRegistry, EngineError> {
    let mut registry = AdapterRegistry::new(config.duplicate_policy());
    registry.register_database(DRIVER, SqliteAdapter::new())?;
    registry.register_router(ROUTER_NAME, AxumRouter::new())?;
    registry.register_theme(THEME_NAME, PlainTheme::new())?;
    Ok(registry)
}

/// One [`SchemaGenerator`] shared by every table listed in `config.tables`,
/// in the listed order.
///
/// # Errors
///
/// Returns [`EngineError::DuplicateGenerator`] if a table is listed twice
/// under a rejecting policy.
pub fn generators(config: &Config) -> Result<GeneratorRegistry, EngineError> {
    let mut generators = GeneratorRegistry::new(config.duplicate_policy());
    let schema: Arc<dyn TableGenerator> = Arc::new(SchemaGenerator::new());
    for table in &config.tables {
        generators.register_shared(table.clone(), Arc::clone(&schema))?;
    }
    Ok(generators)
}

/// Build the engine described by `config` with the bundled adapters and a
/// dashboard at the admin prefix.
///
/// # Errors
///
/// Returns the [`EngineError`] of the first failing build phase.
pub async fn build(config: Config) -> Result<Engine, EngineError> {
    let registry = adapter_registry(&config)?;
    let generators = generators(&config)?;

    let prefix = match config.server.prefix.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    };
    let dashboard = CustomRoute::page(
        prefix.clone(),
        "Dashboard",
        Arc::new(DashboardPage::new(prefix)),
    );

    Engine::builder(config, &registry)
        .generators(generators)
        .custom_route(dashboard)
        .build()
        .await
}
