//! State handed to the axum handlers.
//!
//! Every route gets its own state so that a handler knows which table (or
//! page) it serves without parsing the path.

use std::sync::Arc;

use adminkit_app::ports::theme::{Chrome, NavItem};
use adminkit_app::ports::{Connection, PageHandler, ThemeAdapter};
use adminkit_app::routes::record_path;
use adminkit_domain::action::Action;
use adminkit_domain::descriptor::TableDescriptor;

/// Collaborators shared by every route of one installed app.
pub(crate) struct Shared {
    pub connection: Arc<dyn Connection>,
    pub theme: Arc<dyn ThemeAdapter>,
    pub prefix: String,
    pub nav: Vec<NavItem>,
    pub tables: Vec<Arc<TableDescriptor>>,
}

impl Shared {
    pub fn chrome(&self) -> Chrome<'_> {
        Chrome {
            prefix: &self.prefix,
            nav: &self.nav,
        }
    }
}

/// State of a table route.
#[derive(Clone)]
pub(crate) struct TableState {
    pub shared: Arc<Shared>,
    pub table: Arc<TableDescriptor>,
    /// `<prefix>/<route_prefix>`.
    pub base: Arc<str>,
}

impl TableState {
    pub fn record_path(&self, id: &str) -> String {
        record_path(&self.base, id)
    }

    /// Where to send the browser after a successful write on record `id`.
    pub fn after_write(&self, id: &str) -> String {
        if self.table.permits(Action::Detail) {
            self.record_path(id)
        } else {
            self.base.to_string()
        }
    }
}

/// State of an operator page.
#[derive(Clone)]
pub(crate) struct PageState {
    pub shared: Arc<Shared>,
    pub handler: Arc<dyn PageHandler>,
}
