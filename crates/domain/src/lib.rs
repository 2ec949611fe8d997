//! # adminkit-domain
//!
//! Pure domain model for the adminkit admin engine.
//!
//! ## Responsibilities
//! - Define **table descriptors** (the immutable artifact a generator produces)
//! - Define **fields** with their storage type, display widget and validation rule
//! - Define **actions** (list, detail, create, edit, delete, export) and the
//!   access rules guarding them
//! - Coerce and validate raw form input into typed records
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod access;
pub mod action;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod record;
