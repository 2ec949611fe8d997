//! Engine error taxonomy.
//!
//! Every variant is fatal to startup; nothing in the bootstrap path retries.

use adminkit_domain::error::DescriptorError;

use crate::config::ConfigError;
use crate::ports::database::DatabaseError;
use crate::ports::generator::GeneratorError;
use crate::ports::router::RouterError;
use crate::registry::AdapterKind;
use crate::routes::RouteConflict;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no {kind} adapter named {name:?} (available: {})", available.join(", "))]
    AdapterNotFound {
        kind: AdapterKind,
        name: String,
        available: Vec<String>,
    },

    #[error("{kind} adapter {name:?} is already registered")]
    DuplicateAdapter { kind: AdapterKind, name: String },

    #[error("generator {0:?} is already registered")]
    DuplicateGenerator(String),

    #[error("failed to open {driver} connection")]
    ConnectionFailed {
        driver: String,
        #[source]
        source: DatabaseError,
    },

    #[error("generator {name:?} failed")]
    GeneratorFailed {
        name: String,
        #[source]
        source: GeneratorError,
    },

    #[error("descriptor for table {table:?} is invalid")]
    DescriptorInvalid {
        table: String,
        #[source]
        source: DescriptorError,
    },

    #[error("route conflict")]
    RouteConflict(#[from] RouteConflict),

    #[error("router {router:?} rejected the route plan")]
    InstallFailed {
        router: String,
        #[source]
        source: RouterError,
    },

    #[error("failed to listen on {addr}")]
    ListenFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
