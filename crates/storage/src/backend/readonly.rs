//! Dry-run storage decorator.

use crate::backend::BlobInfoStream;
use crate::error::Result;
use crate::{BackendHandle, StorageBackend};
use async_trait::async_trait;
use std::path::Path;

/// Read-only storage backend.
///
/// Wraps another backend and drops every write, logging an
/// [`info event`](tracing::Event) instead. Reads pass straight through so a
/// dry run still sees the existing database.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a> {
        self.inner.list_stream(prefix)
    }

    async fn exists(&self, key: &Path) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn read(&self, key: &Path) -> Result<Vec<u8>> {
        self.inner.read(key).await
    }

    async fn write(&self, key: &Path, data: &[u8]) -> Result<()> {
        crate::validate_key(key)?;
        tracing::info!(backend = self.inner.name(), key = %key.display(), bytes = data.len(), "Dry run, not writing blob");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped() {
        let inner: BackendHandle = Arc::new(MockBackend::with_blobs([("index.json", b"{}")]));
        let backend = ReadOnlyBackend::new(inner.clone());

        backend.write(Path::new("index.json"), b"{\"cdda\":{}}").await.unwrap();
        backend.write(Path::new("cdda/cdda_releases.json"), b"[]").await.unwrap();

        assert_eq!(backend.read(Path::new("index.json")).await.unwrap(), b"{}");
        assert!(!inner.exists(Path::new("cdda/cdda_releases.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_keys_still_rejected() {
        let backend = ReadOnlyBackend::new(Arc::new(MockBackend::default()));
        assert!(backend.write(Path::new("../escape.json"), b"[]").await.is_err());
    }
}
