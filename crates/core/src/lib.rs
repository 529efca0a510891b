//! Domain logic shared by the database, document, and API layers.
//!
//! This crate has no internal dependencies so it can be used from any other
//! workspace member (and from future CLI tooling) without pulling in the
//! web or database stacks.

pub mod audit;
pub mod error;
pub mod naming;
pub mod numtext;
pub mod permissions;
pub mod types;
