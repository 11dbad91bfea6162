//! Storage backend trait and implementations.
//!
//! The release database is a handful of small JSON blobs per game plus one
//! index, so the trait is a whole-blob interface: no partial reads, no
//! streaming writers.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod readonly;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
pub use self::readonly::ReadOnlyBackend;
use crate::error::Result;
use crate::models::BlobInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::path::Path;
use std::pin::Pin;

pub(crate) type BlobInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<BlobInfo>> + Send + 'a>>;

/// Unified interface for storage backends.
///
/// All keys are relative to the storage root and are validated with
/// [`validate_key`](crate::validate_key) by implementations before use.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reldb_storage::{backend::StorageBackend, error::Result};
///
/// async fn index_size(backend: &dyn StorageBackend) -> Result<usize> {
///     let key = Path::new("index.json");
///     if backend.exists(key).await? {
///         Ok(backend.read(key).await?.len())
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, used for logging only.
    fn name(&self) -> &str;

    /// List all blobs under an optional key prefix.
    ///
    /// Collects [`list_stream()`](Self::list_stream) into a [`Vec`].
    async fn list(&self, prefix: Option<&Path>) -> Result<Vec<BlobInfo>> {
        self.list_stream(prefix).try_collect().await
    }

    /// Stream blob metadata under an optional key prefix.
    ///
    /// Prefix matching is component based: `cdda` matches
    /// `cdda/cdda_releases.json` but not `cddax/index.json`. Blobs that are
    /// still being written are never listed.
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a>;

    /// Check if a blob exists.
    async fn exists(&self, key: &Path) -> Result<bool>;

    /// Read a whole blob.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if nothing is
    /// stored under the key.
    async fn read(&self, key: &Path) -> Result<Vec<u8>>;

    /// Replace a blob.
    ///
    /// A reader observes either the previous contents or the new contents,
    /// never a partial write. Parent "directories" are created as needed.
    async fn write(&self, key: &Path, data: &[u8]) -> Result<()>;
}
