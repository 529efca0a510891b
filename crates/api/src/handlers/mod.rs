//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod folders;
pub mod generation;
pub mod settings;
pub mod templates;
