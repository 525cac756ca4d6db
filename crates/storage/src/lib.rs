//! Blob storage for portfolio media.
//!
//! Thin client over any S3-compatible object store: upload, best-effort
//! delete, and public URL derivation. Object keys come from
//! `atelier_core::object_key`.

pub mod client;
pub mod error;

pub use client::{ObjectStore, StorageConfig};
pub use error::StorageError;
