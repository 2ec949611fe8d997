//! Generator port — application-supplied producers of table descriptors.

use async_trait::async_trait;

use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::error::DescriptorError;

use crate::ports::database::{Connection, DatabaseError};

/// Why a generator could not produce a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("table {0:?} does not exist")]
    TableNotFound(String),

    #[error("no generator registered under {0:?}")]
    NotRegistered(String),

    #[error("descriptor rejected by builder")]
    Descriptor(#[from] DescriptorError),

    #[error("introspection failed")]
    Database(#[from] DatabaseError),

    #[error("generator failed")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Produces a [`TableDescriptor`] for a model name from a live connection.
///
/// Plain functions and closures of shape
/// `Fn(&str) -> Result<TableDescriptor, GeneratorError>` are generators too,
/// for descriptors that need no introspection.
#[async_trait]
pub trait TableGenerator: Send + Sync {
    async fn generate(
        &self,
        connection: &dyn Connection,
        name: &str,
    ) -> Result<TableDescriptor, GeneratorError>;
}

#[async_trait]
impl<F> TableGenerator for F
where
    F: Fn(&str) -> Result<TableDescriptor, GeneratorError> + Send + Sync,
{
    async fn generate(
        &self,
        _connection: &dyn Connection,
        name: &str,
    ) -> Result<TableDescriptor, GeneratorError> {
        (self)(name)
    }
}
