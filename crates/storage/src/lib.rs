//! Blob storage for the release database.
//!
//! Everything reldb persists (release lists, tag caches, the version index)
//! is a small JSON blob addressed by a relative key such as
//! `cdda/cdda_releases.json`. This crate hides where those blobs live behind
//! the [`StorageBackend`] trait.

pub mod backend;
pub mod error;
mod key;
mod models;

pub use crate::backend::StorageBackend;
pub use crate::key::validate as validate_key;
pub use crate::models::BlobInfo;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
