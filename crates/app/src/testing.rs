//! In-memory doubles of the ports, shared by the unit tests of this crate.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::net::TcpListener;

use adminkit_domain::descriptor::TableDescriptor;
use adminkit_domain::field::{Field, FieldType};
use adminkit_domain::record::Record;

use crate::lifecycle::ShutdownSignal;
use crate::ports::database::{
    ColumnInfo, Connection, DatabaseAdapter, DatabaseError, ListQuery, RecordPage,
};
use crate::ports::router::{HttpApp, InstallContext, RouterAdapter, RouterError};
use crate::ports::theme::{DetailView, FormView, ListView, PageView, ThemeAdapter, ThemeError};
use crate::routes::{Method, RoutePlan};

/// Connection that stores nothing and counts `close` calls.
#[derive(Debug, Default)]
pub struct InMemoryConnection {
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl InMemoryConnection {
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for InMemoryConnection {
    fn driver(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.is_closed() {
            return Err(DatabaseError::Closed);
        }
        Ok(())
    }

    async fn describe(&self, _table: &str) -> Result<Vec<ColumnInfo>, DatabaseError> {
        Ok(Vec::new())
    }

    async fn list(
        &self,
        _table: &TableDescriptor,
        query: &ListQuery,
    ) -> Result<RecordPage, DatabaseError> {
        Ok(RecordPage {
            records: Vec::new(),
            total: 0,
            page: query.page,
            per_page: query.per_page,
        })
    }

    async fn fetch(
        &self,
        _table: &TableDescriptor,
        _id: &str,
    ) -> Result<Option<Record>, DatabaseError> {
        Ok(None)
    }

    async fn insert(
        &self,
        _table: &TableDescriptor,
        _record: &Record,
    ) -> Result<String, DatabaseError> {
        Ok("1".to_string())
    }

    async fn update(
        &self,
        _table: &TableDescriptor,
        _id: &str,
        _record: &Record,
    ) -> Result<(), DatabaseError> {
        Err(DatabaseError::NotFound)
    }

    async fn delete(&self, _table: &TableDescriptor, _id: &str) -> Result<(), DatabaseError> {
        Err(DatabaseError::NotFound)
    }

    async fn count(&self, _table: &TableDescriptor) -> Result<u64, DatabaseError> {
        Ok(0)
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Database adapter handing out one shared [`InMemoryConnection`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryDatabase {
    pub connection: Arc<InMemoryConnection>,
    pub teardowns: Arc<AtomicUsize>,
    pub fail: bool,
}

impl InMemoryDatabase {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DatabaseAdapter for InMemoryDatabase {
    async fn open(&self, dsn: &str) -> Result<Arc<dyn Connection>, DatabaseError> {
        if self.fail {
            return Err(DatabaseError::Storage(
                format!("cannot reach {dsn}").into(),
            ));
        }
        Ok(self.connection.clone())
    }

    async fn teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// Router that records every plan it installs and serves plain TCP.
#[derive(Debug, Default, Clone)]
pub struct RecordingRouter {
    pub installs: Arc<Mutex<Vec<Vec<(Method, String)>>>>,
    pub teardowns: Arc<AtomicUsize>,
    /// Installed apps fail as soon as they start serving.
    pub fail_serve: bool,
}

impl RecordingRouter {
    pub fn install_count(&self) -> usize {
        self.installs.lock().unwrap().len()
    }

    pub fn installed_routes(&self) -> usize {
        self.installs.lock().unwrap().iter().map(Vec::len).sum()
    }
}

impl RouterAdapter for RecordingRouter {
    fn install(
        &self,
        plan: RoutePlan,
        _ctx: InstallContext,
    ) -> Result<Box<dyn HttpApp>, RouterError> {
        let routes: Vec<(Method, String)> = plan
            .routes()
            .iter()
            .map(|r| (r.method, r.path.clone()))
            .collect();
        self.installs.lock().unwrap().push(routes.clone());
        Ok(Box::new(RecordedApp {
            routes,
            fail: self.fail_serve,
        }))
    }

    fn teardown(&self) {
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }
}

struct RecordedApp {
    routes: Vec<(Method, String)>,
    fail: bool,
}

#[async_trait]
impl HttpApp for RecordedApp {
    fn routes(&self) -> Vec<(Method, String)> {
        self.routes.clone()
    }

    async fn serve(
        self: Box<Self>,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> std::io::Result<()> {
        if self.fail {
            return Err(std::io::Error::other("listener lost"));
        }
        let stop = shutdown.recv();
        tokio::pin!(stop);
        loop {
            tokio::select! {
                () = &mut stop => return Ok(()),
                accepted = listener.accept() => {
                    drop(accepted?);
                }
            }
        }
    }
}

/// Theme that renders nothing.
#[derive(Debug, Default)]
pub struct BlankTheme;

impl ThemeAdapter for BlankTheme {
    fn render_list(&self, _view: &ListView<'_>) -> Result<String, ThemeError> {
        Ok(String::new())
    }

    fn render_detail(&self, _view: &DetailView<'_>) -> Result<String, ThemeError> {
        Ok(String::new())
    }

    fn render_form(&self, _view: &FormView<'_>) -> Result<String, ThemeError> {
        Ok(String::new())
    }

    fn render_page(&self, _view: &PageView<'_>) -> Result<String, ThemeError> {
        Ok(String::new())
    }
}

/// Descriptor with an integer `id` and a text `name`.
pub fn simple_table(name: &str) -> TableDescriptor {
    TableDescriptor::builder(name)
        .field(Field::new("id", FieldType::Integer))
        .field(Field::new("name", FieldType::Text).required())
        .build()
        .unwrap()
}
