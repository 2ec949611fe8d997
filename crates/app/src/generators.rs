//! Generator registry — ordered mapping from model name to [`TableGenerator`].
//!
//! ## Ordering
//!
//! Generators run in registration order. Overriding a name keeps the slot of
//! the first registration, so the order of tables (and of their routes and
//! navigation entries) never depends on which layer supplied the generator.

use std::sync::Arc;

use adminkit_domain::descriptor::TableDescriptor;

use crate::error::EngineError;
use crate::ports::database::Connection;
use crate::ports::generator::{GeneratorError, TableGenerator};
use crate::registry::DuplicatePolicy;

struct Entry {
    name: String,
    generator: Arc<dyn TableGenerator>,
}

/// Named generators, in registration order.
#[derive(Default)]
pub struct GeneratorRegistry {
    policy: DuplicatePolicy,
    entries: Vec<Entry>,
}

impl GeneratorRegistry {
    #[must_use]
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
        }
    }

    /// Register `generator` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateGenerator`] if the name is taken and the
    /// policy is [`DuplicatePolicy::Reject`].
    pub fn register(
        &mut self,
        name: impl Into<String>,
        generator: impl TableGenerator + 'static,
    ) -> Result<(), EngineError> {
        self.register_shared(name, Arc::new(generator))
    }

    /// Register an already shared generator, e.g. one instance serving many names.
    ///
    /// # Errors
    ///
    /// See [`GeneratorRegistry::register`].
    pub fn register_shared(
        &mut self,
        name: impl Into<String>,
        generator: Arc<dyn TableGenerator>,
    ) -> Result<(), EngineError> {
        let name = name.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(_) if self.policy == DuplicatePolicy::Reject => {
                Err(EngineError::DuplicateGenerator(name))
            }
            Some(entry) => {
                tracing::warn!(%name, "generator registration overrides an earlier one");
                entry.generator = generator;
                Ok(())
            }
            None => {
                self.entries.push(Entry { name, generator });
                Ok(())
            }
        }
    }

    /// Registered names in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the generator registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GeneratorFailed`] if nothing is registered under
    /// `name` or the generator fails.
    pub async fn generate(
        &self,
        name: &str,
        connection: &dyn Connection,
    ) -> Result<TableDescriptor, EngineError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| EngineError::GeneratorFailed {
                name: name.to_string(),
                source: GeneratorError::NotRegistered(name.to_string()),
            })?;
        run(entry, connection).await
    }

    /// Run every generator once, in registration order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::GeneratorFailed`] naming the failing generator.
    pub async fn generate_all(
        &self,
        connection: &dyn Connection,
    ) -> Result<Vec<TableDescriptor>, EngineError> {
        let mut descriptors = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            descriptors.push(run(entry, connection).await?);
        }
        Ok(descriptors)
    }
}

async fn run(entry: &Entry, connection: &dyn Connection) -> Result<TableDescriptor, EngineError> {
    tracing::debug!(name = %entry.name, "running generator");
    entry
        .generator
        .generate(connection, &entry.name)
        .await
        .map_err(|source| EngineError::GeneratorFailed {
            name: entry.name.clone(),
            source,
        })
}
