//! Axum handlers, one module per kind of route.

pub(crate) mod export;
pub(crate) mod pages;
pub(crate) mod records;

use adminkit_domain::access::Principal;
use adminkit_domain::action::Action;

use crate::error::HttpError;
use crate::state::TableState;

/// Reject the request unless `principal` may perform `action` on the table.
fn authorize(state: &TableState, action: Action, principal: &Principal) -> Result<(), HttpError> {
    if state.table.allows(action, principal) {
        Ok(())
    } else {
        tracing::debug!(
            table = %state.table.name,
            %action,
            user = ?principal.user,
            "access denied"
        );
        Err(HttpError::Forbidden)
    }
}
