//! Local filesystem storage backend.
//!
//! Blobs are plain files under a root directory (`db/` by default), accessed
//! via `tokio::fs`. Writes go to a staging sibling first and are renamed into
//! place so an interrupted run never leaves a truncated JSON file behind.

use crate::backend::BlobInfoStream;
use crate::error::{ErrorKind, Result};
use crate::key::{is_staging, staging_for, validate as validate_key};
use crate::models::BlobInfo;
use crate::StorageBackend;
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};
use tokio::io::AsyncWriteExt;

enum WalkEntry {
    Blob(BlobInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use reldb_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("db", "/srv/releases/db")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a backend rooted at an absolute directory, creating it if it
    /// does not exist yet.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidKey(root));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidKey(root));
            }
        } else {
            // Only happens once at startup, not worth an async constructor.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    fn absolute_path(&self, key: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root.join(validate_key(key)?))
    }

    fn relative_key(&self, absolute: &Path) -> Result<PathBuf> {
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{}` is not within root `{}`", absolute.display(), self.root.display()))
        })?;
        Ok(validate_key(relative)?)
    }

    fn blob_info(key: PathBuf, metadata: Metadata) -> Result<BlobInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(BlobInfo::new(key, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    // Can't `?` inside the stream loop, so the fallible part of each entry
    // lives here.
    async fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        if metadata.is_dir() {
            return Ok(WalkEntry::Descend(path));
        }
        if !metadata.is_file() || is_staging(&path) {
            return Ok(WalkEntry::Skip);
        }
        let key = self.relative_key(&path)?;
        if let Some(prefix) = prefix
            && !key.starts_with(prefix)
        {
            return Ok(WalkEntry::Skip);
        }
        Ok(WalkEntry::Blob(Self::blob_info(key, metadata)?))
    }

    async fn write_staged(&self, target: &Path, key: &Path, data: &[u8]) -> Result<()> {
        let staging = staging_for(target);
        let mut file = fs::File::create(&staging).await.map_err(|e| Self::map_io_error(e, key))?;
        file.write_all(data).await.map_err(ErrorKind::Io)?;
        file.sync_all().await.map_err(ErrorKind::Io)?;
        drop(file);
        if let Err(e) = fs::rename(&staging, target).await {
            // Best effort, the staging file is invisible to listing anyway.
            let _ = fs::remove_file(&staging).await;
            exn::bail!(Self::map_io_error(e, key));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> BlobInfoStream<'a> {
        let prefix = match prefix.map(validate_key).transpose() {
            Ok(prefix) => prefix,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };
        let mut stack = vec![self.root.clone()];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue 'dirs,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    },
                };
                loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break,
                        Err(e) => {
                            yield Err(exn::Exn::from(Self::map_io_error(e, &current)));
                            continue;
                        },
                    };
                    match self.process_entry(entry, prefix.as_deref()).await {
                        Ok(WalkEntry::Blob(info)) => yield Ok(info),
                        Ok(WalkEntry::Descend(dir)) => stack.push(dir),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    }
                }
            }
        })
    }

    async fn exists(&self, key: &Path) -> Result<bool> {
        let path = self.absolute_path(key)?;
        Ok(fs::try_exists(&path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, key: &Path) -> Result<Vec<u8>> {
        let path = self.absolute_path(key)?;
        Ok(fs::read(&path).await.map_err(|e| Self::map_io_error(e, key))?)
    }

    #[tracing::instrument(level = "trace", skip(self, data), fields(bytes = data.len()))]
    async fn write(&self, key: &Path, data: &[u8]) -> Result<()> {
        let path = self.absolute_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, key))?;
        }
        self.write_staged(&path, key, data).await
    }
}
