//! Engine — composes the configured adapters into a running admin surface.
//!
//! ## Build phases
//!
//! [`EngineBuilder::build`] runs these phases strictly in order; the first
//! failure stops the sequence and releases whatever was acquired so far.
//!
//! 1. Resolve the database adapter and open the connection.
//! 2. Resolve the router and theme adapters.
//! 3. Run every generator and validate each descriptor.
//! 4. Plan every route, check it for conflicts, and hand the whole plan to
//!    the router in a single `install` call.
//!
//! Nothing is installed unless every phase succeeds.
//!
//! ## Running
//!
//! [`Engine::start`] binds the listener and serves on a background task.
//! [`RunningEngine::shutdown`] stops intake, waits up to the configured drain
//! timeout for the server task, closes the connection once and runs the
//! adapters' teardown hooks.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use adminkit_domain::action::Action;
use adminkit_domain::descriptor::TableDescriptor;

use crate::config::Config;
use crate::error::EngineError;
use crate::generators::GeneratorRegistry;
use crate::lifecycle::{
    Lifecycle, LifecycleState, ShutdownSignal, ShutdownTrigger, shutdown_channel,
};
use crate::ports::database::{Connection, DatabaseAdapter};
use crate::ports::router::{HttpApp, InstallContext, RouterAdapter};
use crate::ports::theme::ThemeAdapter;
use crate::registry::AdapterRegistry;
use crate::routes::{CustomRoute, Method, RoutePlan, StaticMount};

/// Accumulates options for an [`Engine`]; all fallible work happens in
/// [`EngineBuilder::build`].
pub struct EngineBuilder<'r> {
    config: Config,
    registry: &'r AdapterRegistry,
    generators: GeneratorRegistry,
    router: Option<(String, Arc<dyn RouterAdapter>)>,
    custom_routes: Vec<CustomRoute>,
    static_mounts: Vec<StaticMount>,
}

/// Adapters resolved in phases 1 and 2.
struct Adapters {
    database: Arc<dyn DatabaseAdapter>,
    router_name: String,
    router: Arc<dyn RouterAdapter>,
    theme: Arc<dyn ThemeAdapter>,
}

impl EngineBuilder<'_> {
    /// Use `generators` to produce the tables.
    #[must_use]
    pub fn generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    /// Use `router` instead of resolving `config.router` from the registry.
    #[must_use]
    pub fn router(mut self, name: impl Into<String>, router: Arc<dyn RouterAdapter>) -> Self {
        self.router = Some((name.into(), router));
        self
    }

    /// Add an operator-supplied route, such as a dashboard page.
    #[must_use]
    pub fn custom_route(mut self, route: CustomRoute) -> Self {
        self.custom_routes.push(route);
        self
    }

    /// Serve `dir` under `mount`, in addition to the configured uploads mount.
    #[must_use]
    pub fn static_mount(mut self, mount: StaticMount) -> Self {
        self.static_mounts.push(mount);
        self
    }

    /// Run the build phases and return an engine ready to start.
    ///
    /// # Errors
    ///
    /// Returns the [`EngineError`] of the first failing phase. The connection,
    /// if it was opened, is closed before returning.
    #[tracing::instrument(
        name = "engine.build",
        skip_all,
        fields(driver = %self.config.database.driver, router = %self.config.router)
    )]
    pub async fn build(self) -> Result<Engine, EngineError> {
        let Self {
            config,
            registry,
            generators,
            router,
            custom_routes,
            static_mounts,
        } = self;

        let database = registry.resolve_database(&config.database.driver)?;
        let connection = database
            .open(&config.database.dsn)
            .await
            .map_err(|source| EngineError::ConnectionFailed {
                driver: config.database.driver.clone(),
                source,
            })?;
        tracing::info!(driver = %config.database.driver, "database connection opened");

        let adapters = match resolve_adapters(&config, registry, router, &database) {
            Ok(adapters) => adapters,
            Err(err) => {
                connection.close().await;
                database.teardown().await;
                return Err(err);
            }
        };

        match assemble(
            &config,
            &generators,
            &adapters,
            &connection,
            custom_routes,
            static_mounts,
        )
        .await
        {
            Ok((tables, app)) => {
                let routes = app.routes();
                tracing::info!(
                    tables = tables.len(),
                    routes = routes.len(),
                    "admin routes installed"
                );
                Ok(Engine {
                    config,
                    connection,
                    adapters,
                    tables,
                    routes,
                    app,
                    lifecycle: Lifecycle::new(),
                })
            }
            Err(err) => {
                connection.close().await;
                adapters.database.teardown().await;
                Err(err)
            }
        }
    }
}

fn resolve_adapters(
    config: &Config,
    registry: &AdapterRegistry,
    router: Option<(String, Arc<dyn RouterAdapter>)>,
    database: &Arc<dyn DatabaseAdapter>,
) -> Result<Adapters, EngineError> {
    let (router_name, router) = match router {
        Some(explicit) => explicit,
        None => (
            config.router.clone(),
            registry.resolve_router(&config.router)?,
        ),
    };
    let theme = registry.resolve_theme(&config.theme)?;
    Ok(Adapters {
        database: Arc::clone(database),
        router_name,
        router,
        theme,
    })
}

/// Validated tables and the router's installed application.
type Assembled = (Vec<Arc<TableDescriptor>>, Box<dyn HttpApp>);

async fn assemble(
    config: &Config,
    generators: &GeneratorRegistry,
    adapters: &Adapters,
    connection: &Arc<dyn Connection>,
    custom_routes: Vec<CustomRoute>,
    static_mounts: Vec<StaticMount>,
) -> Result<Assembled, EngineError> {
    let export = config.feature("export");
    let mut tables = Vec::with_capacity(generators.len());
    for mut table in generators.generate_all(connection.as_ref()).await? {
        if !export {
            table.actions.remove(&Action::Export);
            table.access.remove(&Action::Export);
        }
        table
            .validate()
            .map_err(|source| EngineError::DescriptorInvalid {
                table: table.name.clone(),
                source,
            })?;
        tables.push(Arc::new(table));
    }

    let mut plan = RoutePlan::new(&config.server.prefix);
    for table in &tables {
        plan.add_table(Arc::clone(table))?;
    }
    for route in custom_routes {
        plan.add_custom(route)?;
    }
    let uploads = config.uploads.iter().map(|uploads| StaticMount {
        mount: uploads.mount.clone(),
        dir: uploads.dir.clone(),
    });
    for mount in uploads.chain(static_mounts) {
        plan.add_static(mount)?;
    }

    let ctx = InstallContext {
        connection: Arc::clone(connection),
        theme: Arc::clone(&adapters.theme),
        request_tracing: config.feature("request_tracing"),
    };
    let app = adapters
        .router
        .install(plan, ctx)
        .map_err(|source| EngineError::InstallFailed {
            router: adapters.router_name.clone(),
            source,
        })?;
    Ok((tables, app))
}

/// A fully built admin surface that has not started listening yet.
pub struct Engine {
    config: Config,
    connection: Arc<dyn Connection>,
    adapters: Adapters,
    tables: Vec<Arc<TableDescriptor>>,
    routes: Vec<(Method, String)>,
    app: Box<dyn HttpApp>,
    lifecycle: Lifecycle,
}

impl Engine {
    /// Start building an engine for `config`, resolving adapters from `registry`.
    #[must_use]
    pub fn builder(config: Config, registry: &AdapterRegistry) -> EngineBuilder<'_> {
        EngineBuilder {
            generators: GeneratorRegistry::new(config.duplicate_policy()),
            config,
            registry,
            router: None,
            custom_routes: Vec::new(),
            static_mounts: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The live connection, for application code running next to the engine.
    #[must_use]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    /// Validated descriptors, in installation order.
    #[must_use]
    pub fn tables(&self) -> &[Arc<TableDescriptor>] {
        &self.tables
    }

    /// Installed (method, path) pairs.
    #[must_use]
    pub fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Release an engine that will not be started: close the connection and
    /// run the adapters' teardown hooks.
    ///
    /// Dropping an engine without [`start`](Self::start) or `close` skips
    /// the teardown hooks and leaves the connection to its last handle.
    #[tracing::instrument(name = "engine.close", skip(self))]
    pub async fn close(self) {
        release(self.connection.as_ref(), &self.adapters).await;
        tracing::info!("engine closed before start");
    }

    /// Bind `addr` and serve on a background task.
    ///
    /// Returns once the listener is bound.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ListenFailed`] if the address cannot be bound;
    /// the connection is closed and the adapters torn down before returning.
    #[tracing::instrument(name = "engine.start", skip(self))]
    pub async fn start(self, addr: &str) -> Result<RunningEngine, EngineError> {
        let Self {
            config,
            connection,
            adapters,
            tables,
            routes,
            app,
            lifecycle,
        } = self;
        advance(&lifecycle, LifecycleState::Starting);

        let bound = match TcpListener::bind(addr).await {
            Ok(listener) => listener.local_addr().map(|local| (listener, local)),
            Err(err) => Err(err),
        };
        let (listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(source) => {
                tracing::error!(%addr, error = %source, "failed to bind listener");
                release(connection.as_ref(), &adapters).await;
                advance(&lifecycle, LifecycleState::Closed);
                return Err(EngineError::ListenFailed {
                    addr: addr.to_string(),
                    source,
                });
            }
        };

        let (trigger, signal) = shutdown_channel();
        let stopped = Arc::new(AtomicBool::new(false));
        let server = tokio::spawn(watch_server(
            app.serve(listener, signal.clone()),
            signal,
            Arc::clone(&stopped),
        ));
        advance(&lifecycle, LifecycleState::Running);
        tracing::info!(%local_addr, "admin surface listening");

        Ok(RunningEngine {
            drain_timeout: config.drain_timeout(),
            config,
            local_addr,
            connection,
            adapters,
            tables,
            routes,
            lifecycle,
            trigger,
            stopped,
            server: Mutex::new(Some(server)),
        })
    }
}

/// An engine serving requests on a background task.
pub struct RunningEngine {
    config: Config,
    drain_timeout: Duration,
    local_addr: SocketAddr,
    connection: Arc<dyn Connection>,
    adapters: Adapters,
    tables: Vec<Arc<TableDescriptor>>,
    routes: Vec<(Method, String)>,
    lifecycle: Lifecycle,
    trigger: ShutdownTrigger,
    stopped: Arc<AtomicBool>,
    server: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
}

impl RunningEngine {
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle phase.
    ///
    /// Only [`shutdown`](Self::shutdown) moves a running engine on; a server
    /// that stops by itself leaves the state at `Running` (see
    /// [`is_serving`](Self::is_serving)).
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Whether the server task is still accepting connections.
    #[must_use]
    pub fn is_serving(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    /// Watch lifecycle transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.lifecycle.subscribe()
    }

    #[must_use]
    pub fn connection(&self) -> &Arc<dyn Connection> {
        &self.connection
    }

    #[must_use]
    pub fn tables(&self) -> &[Arc<TableDescriptor>] {
        &self.tables
    }

    #[must_use]
    pub fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }

    /// Stop intake, drain, close the connection and tear the adapters down.
    ///
    /// Only the first call does any work; later calls wait for it to finish
    /// and return.
    #[tracing::instrument(name = "engine.shutdown", skip(self))]
    pub async fn shutdown(&self) {
        let mut server = self.server.lock().await;
        let Some(mut handle) = server.take() else {
            return;
        };

        advance(&self.lifecycle, LifecycleState::Draining);
        self.trigger.trigger();

        match tokio::time::timeout(self.drain_timeout, &mut handle).await {
            Ok(Ok(Ok(()))) => tracing::debug!("server drained"),
            Ok(Ok(Err(err))) => tracing::warn!(%err, "server stopped with an error"),
            Ok(Err(err)) => tracing::warn!(%err, "server task failed"),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.drain_timeout.as_secs(),
                    "drain timeout elapsed, aborting in-flight requests"
                );
                handle.abort();
            }
        }

        release(self.connection.as_ref(), &self.adapters).await;
        advance(&self.lifecycle, LifecycleState::Closed);
        tracing::info!("engine closed");
    }

    /// Serve until `signal` resolves, then shut down.
    pub async fn run_until<F>(self, signal: F)
    where
        F: Future<Output = ()> + Send,
    {
        signal.await;
        tracing::info!("termination signal received");
        self.shutdown().await;
    }

    /// Serve until the process receives Ctrl-C or SIGTERM, then shut down.
    pub async fn run_until_interrupt(self) {
        self.run_until(crate::lifecycle::interrupt()).await;
    }
}

/// Run the server and warn when it ends without a shutdown request.
async fn watch_server<F>(
    serve: F,
    signal: ShutdownSignal,
    stopped: Arc<AtomicBool>,
) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let result = serve.await;
    stopped.store(true, Ordering::SeqCst);
    if !signal.is_triggered() {
        match &result {
            Ok(()) => tracing::warn!("server stopped before shutdown was requested"),
            Err(err) => tracing::warn!(%err, "server failed before shutdown was requested"),
        }
    }
    result
}

fn advance(lifecycle: &Lifecycle, next: LifecycleState) {
    if let Err(err) = lifecycle.advance(next) {
        tracing::warn!(%err, "ignored lifecycle transition");
    }
}

async fn release(connection: &dyn Connection, adapters: &Adapters) {
    connection.close().await;
    adapters.router.teardown();
    adapters.theme.teardown();
    adapters.database.teardown().await;
}
