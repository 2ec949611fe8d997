//! Adapter registry — explicit, per-process table of named adapters.
//!
//! The composition root creates one [`AdapterRegistry`], registers every
//! adapter it links in, and hands it to [`Engine::builder`](crate::engine::Engine::builder),
//! which resolves the router, database and theme by the names in the
//! configuration.
//!
//! Registering a second adapter of the same kind under an existing name
//! either replaces the first ([`DuplicatePolicy::Override`]) or fails
//! ([`DuplicatePolicy::Reject`]).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::EngineError;
use crate::ports::database::DatabaseAdapter;
use crate::ports::router::RouterAdapter;
use crate::ports::theme::ThemeAdapter;

/// Capability an adapter provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdapterKind {
    Router,
    Database,
    Theme,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Router => "router",
            Self::Database => "database",
            Self::Theme => "theme",
        })
    }
}

/// What happens when a name is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The later registration replaces the earlier one.
    #[default]
    Override,
    /// The later registration fails.
    Reject,
}

/// An adapter of any kind, ready to be registered.
#[derive(Clone)]
pub enum Adapter {
    Router(Arc<dyn RouterAdapter>),
    Database(Arc<dyn DatabaseAdapter>),
    Theme(Arc<dyn ThemeAdapter>),
}

impl Adapter {
    #[must_use]
    pub fn kind(&self) -> AdapterKind {
        match self {
            Self::Router(_) => AdapterKind::Router,
            Self::Database(_) => AdapterKind::Database,
            Self::Theme(_) => AdapterKind::Theme,
        }
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adapter::{:?}", self.kind())
    }
}

/// Named adapters, keyed by (kind, name).
#[derive(Default)]
pub struct AdapterRegistry {
    policy: DuplicatePolicy,
    routers: BTreeMap<String, Arc<dyn RouterAdapter>>,
    databases: BTreeMap<String, Arc<dyn DatabaseAdapter>>,
    themes: BTreeMap<String, Arc<dyn ThemeAdapter>>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register `adapter` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateAdapter`] if the name is taken for this
    /// kind and the policy is [`DuplicatePolicy::Reject`].
    pub fn register(&mut self, name: impl Into<String>, adapter: Adapter) -> Result<(), EngineError> {
        let name = name.into();
        let kind = adapter.kind();
        let taken = match &adapter {
            Adapter::Router(_) => self.routers.contains_key(&name),
            Adapter::Database(_) => self.databases.contains_key(&name),
            Adapter::Theme(_) => self.themes.contains_key(&name),
        };
        if taken {
            if self.policy == DuplicatePolicy::Reject {
                return Err(EngineError::DuplicateAdapter { kind, name });
            }
            tracing::warn!(%kind, %name, "adapter registration overrides an earlier one");
        } else {
            tracing::debug!(%kind, %name, "adapter registered");
        }

        match adapter {
            Adapter::Router(inner) => {
                self.routers.insert(name, inner);
            }
            Adapter::Database(inner) => {
                self.databases.insert(name, inner);
            }
            Adapter::Theme(inner) => {
                self.themes.insert(name, inner);
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`AdapterRegistry::register`].
    pub fn register_router(
        &mut self,
        name: impl Into<String>,
        adapter: impl RouterAdapter + 'static,
    ) -> Result<(), EngineError> {
        self.register(name, Adapter::Router(Arc::new(adapter)))
    }

    /// # Errors
    ///
    /// See [`AdapterRegistry::register`].
    pub fn register_database(
        &mut self,
        name: impl Into<String>,
        adapter: impl DatabaseAdapter + 'static,
    ) -> Result<(), EngineError> {
        self.register(name, Adapter::Database(Arc::new(adapter)))
    }

    /// # Errors
    ///
    /// See [`AdapterRegistry::register`].
    pub fn register_theme(
        &mut self,
        name: impl Into<String>,
        adapter: impl ThemeAdapter + 'static,
    ) -> Result<(), EngineError> {
        self.register(name, Adapter::Theme(Arc::new(adapter)))
    }

    /// # Errors
    ///
    /// Returns [`EngineError::AdapterNotFound`] listing the registered routers.
    pub fn resolve_router(&self, name: &str) -> Result<Arc<dyn RouterAdapter>, EngineError> {
        lookup(&self.routers, AdapterKind::Router, name)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::AdapterNotFound`] listing the registered databases.
    pub fn resolve_database(&self, name: &str) -> Result<Arc<dyn DatabaseAdapter>, EngineError> {
        lookup(&self.databases, AdapterKind::Database, name)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::AdapterNotFound`] listing the registered themes.
    pub fn resolve_theme(&self, name: &str) -> Result<Arc<dyn ThemeAdapter>, EngineError> {
        lookup(&self.themes, AdapterKind::Theme, name)
    }

    /// Registered names of `kind`, sorted.
    #[must_use]
    pub fn names(&self, kind: AdapterKind) -> Vec<String> {
        match kind {
            AdapterKind::Router => self.routers.keys().cloned().collect(),
            AdapterKind::Database => self.databases.keys().cloned().collect(),
            AdapterKind::Theme => self.themes.keys().cloned().collect(),
        }
    }
}

fn lookup<T: ?Sized>(
    map: &BTreeMap<String, Arc<T>>,
    kind: AdapterKind,
    name: &str,
) -> Result<Arc<T>, EngineError> {
    map.get(name)
        .cloned()
        .ok_or_else(|| EngineError::AdapterNotFound {
            kind,
            name: name.to_string(),
            available: map.keys().cloned().collect(),
        })
}
