//! # adminkit-adapter-http-axum
//!
//! HTTP router adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Implement `RouterAdapter` from `adminkit-app::ports::router`
//! - Turn a conflict-free route plan into one axum [`Router`](axum::Router):
//!   a CRUD route group per table, operator pages and static upload mounts
//! - Derive the acting [`Principal`](adminkit_domain::access::Principal) from
//!   headers set by a fronting authentication proxy and enforce access rules
//! - Map database and theme failures into HTTP responses
//!
//! ## No-JS admin approach
//! - Every page is rendered server-side by the configured theme.
//! - Create, edit and delete are `<form>` POSTs answered with a `303 See Other`
//!   redirect (PRG pattern); invalid submissions re-render the form with `422`.
//!
//! ## Dependency rule
//! Depends on `adminkit-app` (for ports and the route plan) and
//! `adminkit-domain` (for descriptors and form coercion). Never leaks axum
//! types into the engine.

mod app;
mod error;
mod handlers;
mod principal;
mod router;
mod state;

#[cfg(test)]
mod testing;

pub use app::AxumApp;
pub use principal::{ROLES_HEADER, USER_HEADER};
pub use router::{AxumRouter, ROUTER_NAME, build_router};
