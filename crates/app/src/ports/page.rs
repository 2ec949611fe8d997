//! Custom page port — operator-supplied pages such as a dashboard.

use std::sync::Arc;

use async_trait::async_trait;

use adminkit_domain::access::Principal;
use adminkit_domain::descriptor::TableDescriptor;

use crate::ports::database::{Connection, DatabaseError};

/// Content of a custom page, wrapped in the theme layout by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    /// Trusted HTML; handlers are responsible for escaping what they embed.
    pub body_html: String,
}

impl Page {
    #[must_use]
    pub fn new(title: impl Into<String>, body_html: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body_html: body_html.into(),
        }
    }
}

/// What a page handler can see while rendering.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub connection: &'a dyn Connection,
    pub tables: &'a [Arc<TableDescriptor>],
    pub principal: &'a Principal,
}

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("forbidden")]
    Forbidden,

    #[error("database query failed")]
    Database(#[from] DatabaseError),

    #[error("page failed")]
    Custom(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Renders an operator-supplied route.
#[async_trait]
pub trait PageHandler: Send + Sync {
    async fn render(&self, ctx: PageContext<'_>) -> Result<Page, PageError>;
}

/// A page with fixed content.
#[derive(Debug, Clone)]
pub struct StaticPage(pub Page);

#[async_trait]
impl PageHandler for StaticPage {
    async fn render(&self, _ctx: PageContext<'_>) -> Result<Page, PageError> {
        Ok(self.0.clone())
    }
}
