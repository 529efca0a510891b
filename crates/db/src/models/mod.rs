//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Where needed, an update DTO (all `Option` fields) for patches

pub mod action_log;
pub mod folder;
pub mod permission;
pub mod placeholder;
pub mod session;
pub mod setting;
pub mod template;
pub mod user;
