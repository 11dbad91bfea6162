//! Storage models.

use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// Blob metadata returned by storage backends when listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Relative key from storage root
    pub key: PathBuf,
    /// Blob size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl BlobInfo {
    pub fn new(key: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        Self {
            key: key.into(),
            size,
            modified: modified.into(),
        }
    }

    /// The final component of the key (`cdda_releases.json` for
    /// `cdda/cdda_releases.json`).
    pub fn file_name(&self) -> Option<&str> {
        self.key.file_name().and_then(|name| name.to_str())
    }

    /// The directory the blob sits in, relative to the storage root.
    pub fn directory(&self) -> Option<&Path> {
        self.key.parent().filter(|parent| !parent.as_os_str().is_empty())
    }
}
