//! The installed axum application.

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use adminkit_app::lifecycle::ShutdownSignal;
use adminkit_app::ports::HttpApp;
use adminkit_app::routes::Method;

/// An axum [`Router`] carrying the whole admin surface.
pub struct AxumApp {
    router: Router,
    routes: Vec<(Method, String)>,
}

impl AxumApp {
    pub(crate) fn new(router: Router, routes: Vec<(Method, String)>) -> Self {
        Self { router, routes }
    }

    /// Take the router out, e.g. to nest it into a larger application.
    #[must_use]
    pub fn into_router(self) -> Router {
        self.router
    }
}

#[async_trait]
impl HttpApp for AxumApp {
    fn routes(&self) -> Vec<(Method, String)> {
        self.routes.clone()
    }

    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, routes = self.routes.len(), "admin server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;
        tracing::info!(%addr, "admin server stopped");
        Ok(())
    }
}
