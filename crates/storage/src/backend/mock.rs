//! In-memory storage backend for testing.

use super::BlobInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::key::validate as validate_key;
use crate::models::BlobInfo;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Blobs live in a [`BTreeMap`] behind a [`RwLock`] so listing order is
/// deterministic. Writes are counted, which lets tests assert that an
/// unchanged database was not rewritten.
///
/// # Examples
///
/// ```
/// use reldb_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_blobs([("index.json", b"{}")]);
/// assert!(backend.exists(Path::new("index.json")).await?);
/// assert_eq!(backend.write_count(), 0);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    blobs: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
    writes: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with blobs.
    ///
    /// Panics on an invalid key; broken test setup should not pass.
    pub fn with_blobs(blobs: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let blobs = blobs
            .into_iter()
            .map(|(key, data)| {
                let key = key.into();
                match validate_key(&key) {
                    Ok(validated) => (validated, (now, data.into())),
                    Err(_) => panic!("MockBackend::with_blobs: invalid key {}", key.display()),
                }
            })
            .collect();
        Self {
            name: "mock".to_string(),
            blobs: RwLock::new(blobs),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of successful [`write()`](StorageBackend::write) calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored key, in order.
    pub async fn keys(&self) -> Vec<PathBuf> {
        self.blobs.read().await.keys().cloned().collect()
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let blobs: [(&str, &str); 0] = [];
        Self::with_blobs(blobs)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a> {
        let prefix = match prefix.map(validate_key).transpose() {
            Ok(prefix) => prefix,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot under the lock, yield after releasing it.
            let matching: Vec<BlobInfo> = {
                let blobs = self.blobs.read().await;
                blobs
                    .iter()
                    .filter(|(key, _)| prefix.as_ref().is_none_or(|prefix| key.starts_with(prefix)))
                    .map(|(key, (modified, data))| BlobInfo::new(key.clone(), data.len() as u64, *modified))
                    .collect()
            };
            for info in matching {
                yield Ok(info);
            }
        })
    }

    async fn exists(&self, key: &Path) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.blobs.read().await.contains_key(&key))
    }

    async fn read(&self, key: &Path) -> Result<Vec<u8>> {
        let key = validate_key(key)?;
        match self.blobs.read().await.get(&key) {
            Some((_, data)) => Ok(data.clone()),
            None => exn::bail!(ErrorKind::NotFound(key)),
        }
    }

    async fn write(&self, key: &Path, data: &[u8]) -> Result<()> {
        let key = validate_key(key)?;
        self.blobs.write().await.insert(key, (OffsetDateTime::now_utc(), data.to_vec()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
