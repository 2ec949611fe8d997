//! # adminkit-adapter-theme-askama
//!
//! Server-side rendered HTML theme built on [askama](https://docs.rs/askama).
//!
//! ## Responsibilities
//! - Implement `ThemeAdapter` from `adminkit-app::ports::theme`
//! - Render list, detail, form and custom pages as complete HTML documents
//!   that work with **zero JavaScript**: plain links, GET search forms and
//!   POST forms following the PRG pattern
//! - Escape every value coming from the database
//!
//! ## Dependency rule
//! Depends on `adminkit-app` (for the theme port and view types) and
//! `adminkit-domain` (for field metadata). Knows nothing about HTTP.

mod theme;
mod views;

pub use theme::{PlainTheme, THEME_NAME};
