//! Domain types and catalog rules for the Atelier portfolio platform.
//!
//! This crate is pure: no I/O, no async. The database and API crates build
//! on the types and validation rules defined here.

pub mod catalog;
pub mod error;
pub mod media;
pub mod object_key;
pub mod roles;
pub mod slug;
pub mod types;
