//! Dashboard shown at the admin prefix.

use askama::Template;
use async_trait::async_trait;

use adminkit_app::ports::{Page, PageContext, PageError, PageHandler};
use adminkit_domain::action::Action;

struct TableCount {
    title: String,
    href: String,
    count: u64,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardBody {
    rows: Vec<TableCount>,
}

/// Row counts of every table the caller may list.
#[derive(Debug, Clone)]
pub struct DashboardPage {
    prefix: String,
}

impl DashboardPage {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

#[async_trait]
impl PageHandler for DashboardPage {
    async fn render(&self, ctx: PageContext<'_>) -> Result<Page, PageError> {
        let mut rows = Vec::with_capacity(ctx.tables.len());
        for table in ctx.tables {
            if !table.allows(Action::List, ctx.principal) {
                continue;
            }
            rows.push(TableCount {
                title: table.title.clone(),
                href: format!("{}/{}", self.prefix.trim_end_matches('/'), table.route_prefix),
                count: ctx.connection.count(table).await?,
            });
        }

        let body = DashboardBody { rows }
            .render()
            .map_err(|err| PageError::Custom(Box::new(err)))?;
        Ok(Page::new("Dashboard", body))
    }
}
