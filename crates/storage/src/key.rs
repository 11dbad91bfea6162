//! Blob key validation.
//!
//! Keys are deliberately stricter than general filesystem paths: they are
//! always relative, never contain `..`, and never name a staging file.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Suffix appended to blobs while they are being written.
pub(crate) const STAGING_SUFFIX: &str = ".reldb-staging";

/// Validate a blob key, returning it with redundant `.` components and
/// separators removed.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reldb_storage::validate_key;
///
/// assert_eq!(validate_key("./cdda//cdda_releases.json").unwrap(), Path::new("cdda/cdda_releases.json"));
/// assert!(validate_key("cdda/../index.json").is_err());
/// assert!(validate_key("/etc/passwd").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate(key: impl AsRef<Path>) -> Result<PathBuf> {
    let key = key.as_ref();
    let invalid = || ErrorKind::InvalidKey(key.to_path_buf());

    let mut normalized = PathBuf::new();
    for component in key.components() {
        match component {
            Component::Normal(part) if !part.as_encoded_bytes().contains(&0) => normalized.push(part),
            Component::CurDir => {},
            // Absolute keys, parent traversal, Windows prefixes and null bytes.
            _ => exn::bail!(invalid()),
        }
    }

    if normalized.as_os_str().is_empty() || is_staging(&normalized) {
        exn::bail!(invalid());
    }
    Ok(normalized)
}

/// Whether a key names an in-flight staging blob rather than a real one.
pub(crate) fn is_staging(key: &Path) -> bool {
    key.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(STAGING_SUFFIX))
}

/// The staging sibling a blob is written to before being moved into place.
pub(crate) fn staging_for(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(STAGING_SUFFIX);
    PathBuf::from(staging)
}
