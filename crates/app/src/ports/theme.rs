//! Theme port — turns admin views into HTML documents.

use adminkit_domain::descriptor::{FormErrors, FormMode, TableDescriptor};
use adminkit_domain::record::Record;

use crate::ports::database::RecordPage;

/// Rendering failure inside a theme.
#[derive(Debug, thiserror::Error)]
#[error("failed to render {view} view")]
pub struct ThemeError {
    pub view: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Sidebar navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: String,
    pub href: String,
}

/// Everything shared by every rendered page.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    /// Admin URL prefix (e.g. `/admin`).
    pub prefix: &'a str,
    pub nav: &'a [NavItem],
}

/// List page of one table.
#[derive(Debug)]
pub struct ListView<'a> {
    pub chrome: Chrome<'a>,
    pub table: &'a TableDescriptor,
    pub page: &'a RecordPage,
    /// Current search text, echoed back into the search box.
    pub search: &'a str,
    /// Base path of the table (`/admin/<route_prefix>`).
    pub base: &'a str,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
    pub can_view: bool,
}

/// Detail page of one record.
#[derive(Debug)]
pub struct DetailView<'a> {
    pub chrome: Chrome<'a>,
    pub table: &'a TableDescriptor,
    pub record: &'a Record,
    pub id: &'a str,
    pub base: &'a str,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Create or edit form.
#[derive(Debug)]
pub struct FormView<'a> {
    pub chrome: Chrome<'a>,
    pub table: &'a TableDescriptor,
    pub mode: FormMode,
    /// Values to pre-fill, either the stored record or the rejected submission.
    pub values: &'a Record,
    pub errors: &'a FormErrors,
    /// URL the form posts to.
    pub action: &'a str,
    pub base: &'a str,
}

/// Operator-supplied page wrapped in the theme layout.
#[derive(Debug)]
pub struct PageView<'a> {
    pub chrome: Chrome<'a>,
    pub title: &'a str,
    /// Trusted HTML produced by the page handler.
    pub body_html: &'a str,
}

/// A UI theme selected by name from the configuration.
pub trait ThemeAdapter: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ThemeError`] when the template fails to render.
    fn render_list(&self, view: &ListView<'_>) -> Result<String, ThemeError>;

    /// # Errors
    ///
    /// Returns [`ThemeError`] when the template fails to render.
    fn render_detail(&self, view: &DetailView<'_>) -> Result<String, ThemeError>;

    /// # Errors
    ///
    /// Returns [`ThemeError`] when the template fails to render.
    fn render_form(&self, view: &FormView<'_>) -> Result<String, ThemeError>;

    /// # Errors
    ///
    /// Returns [`ThemeError`] when the template fails to render.
    fn render_page(&self, view: &PageView<'_>) -> Result<String, ThemeError>;

    /// Adapter-specific cleanup, run once during shutdown.
    fn teardown(&self) {}
}
