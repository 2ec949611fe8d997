//! The `plain` theme.

use askama::Template;

use adminkit_app::ports::theme::{
    DetailView, FormView, ListView, PageView, ThemeAdapter, ThemeError,
};

use crate::views::{DetailTemplate, FormTemplate, ListTemplate, PageTemplate};

/// Name under which the daemon registers [`PlainTheme`].
pub const THEME_NAME: &str = "plain";

/// Minimal server-rendered theme with a sidebar and unstyled tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTheme;

impl PlainTheme {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn render(view: &'static str, template: &impl Template) -> Result<String, ThemeError> {
    template.render().map_err(|err| ThemeError {
        view,
        source: Box::new(err),
    })
}

impl ThemeAdapter for PlainTheme {
    fn render_list(&self, view: &ListView<'_>) -> Result<String, ThemeError> {
        render("list", &ListTemplate::from_view(view))
    }

    fn render_detail(&self, view: &DetailView<'_>) -> Result<String, ThemeError> {
        render("detail", &DetailTemplate::from_view(view))
    }

    fn render_form(&self, view: &FormView<'_>) -> Result<String, ThemeError> {
        render("form", &FormTemplate::from_view(view))
    }

    fn render_page(&self, view: &PageView<'_>) -> Result<String, ThemeError> {
        render("page", &PageTemplate::from_view(view))
    }
}
