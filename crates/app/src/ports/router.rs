//! Router port — installs a route plan onto an HTTP framework and serves it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::lifecycle::ShutdownSignal;
use crate::ports::database::Connection;
use crate::ports::theme::ThemeAdapter;
use crate::routes::{Method, RoutePlan};

/// Collaborators handed to the router together with the plan.
#[derive(Clone)]
pub struct InstallContext {
    pub connection: Arc<dyn Connection>,
    pub theme: Arc<dyn ThemeAdapter>,
    /// Wrap the router in a request tracing layer.
    pub request_tracing: bool,
}

/// The router refused the plan.
#[derive(Debug, thiserror::Error)]
#[error("router failed to install routes")]
pub struct RouterError(#[source] pub Box<dyn std::error::Error + Send + Sync>);

/// An installed, ready-to-serve HTTP application.
#[async_trait]
pub trait HttpApp: Send {
    /// Every installed (method, path) pair, in installation order.
    fn routes(&self) -> Vec<(Method, String)>;

    /// Accept connections on `listener` until `shutdown` resolves.
    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> std::io::Result<()>;
}

/// An HTTP framework selected by name from the configuration.
///
/// `install` receives the complete, conflict-free plan in one call so that no
/// route becomes reachable unless all of them do.
pub trait RouterAdapter: Send + Sync {
    /// # Errors
    ///
    /// Returns [`RouterError`] if the framework rejects the plan.
    fn install(
        &self,
        plan: RoutePlan,
        ctx: InstallContext,
    ) -> Result<Box<dyn HttpApp>, RouterError>;

    /// Adapter-specific cleanup, run once during shutdown.
    fn teardown(&self) {}
}
