//! Acting principal, taken from headers set by an authentication proxy.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use adminkit_domain::access::Principal;

/// Authenticated user name.
pub const USER_HEADER: &str = "x-admin-user";
/// Comma separated role list.
pub const ROLES_HEADER: &str = "x-admin-roles";

/// Extracts the [`Principal`] of the current request; requests without the
/// headers act anonymously.
pub(crate) struct Actor(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(principal_from(&parts.headers)))
    }
}

fn principal_from(headers: &HeaderMap) -> Principal {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let mut principal = Principal::anonymous();
    principal.user = header(USER_HEADER).map(ToString::to_string);
    if let Some(roles) = header(ROLES_HEADER) {
        principal.roles = roles
            .split(',')
            .map(str::trim)
            .filter(|role| !role.is_empty())
            .map(ToString::to_string)
            .collect();
    }
    principal
}
