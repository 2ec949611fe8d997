//! Operator-supplied pages.

use axum::extract::State;
use axum::response::Html;

use adminkit_app::ports::PageContext;
use adminkit_app::ports::theme::PageView;

use crate::error::HttpError;
use crate::principal::Actor;
use crate::state::PageState;

/// Render the page handler's content inside the theme layout.
pub(crate) async fn page(
    State(state): State<PageState>,
    Actor(principal): Actor,
) -> Result<Html<String>, HttpError> {
    let shared = &state.shared;
    let page = state
        .handler
        .render(PageContext {
            connection: shared.connection.as_ref(),
            tables: &shared.tables,
            principal: &principal,
        })
        .await?;

    let html = shared.theme.render_page(&PageView {
        chrome: shared.chrome(),
        title: &page.title,
        body_html: &page.body_html,
    })?;
    Ok(Html(html))
}
