use async_trait::async_trait;
use reldb_release::ReleaseMetadata;
use std::sync::Arc;

use crate::error::Result;

/// Lists the tags of a repository.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Tag names of `repo` (`owner/name`), in the order the remote reports
    /// them, without duplicates.
    async fn list_tags(&self, repo: &str) -> Result<Vec<String>>;
}

/// Resolves a tag to its published release.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// `Ok(None)` means the tag has no release, which is a final answer.
    /// Errors may be retryable, see
    /// [`ErrorKind::is_retryable`](crate::error::ErrorKind::is_retryable).
    async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<Option<ReleaseMetadata>>;
}

pub type TagSourceHandle = Arc<dyn TagSource>;
pub type ReleaseSourceHandle = Arc<dyn ReleaseSource>;
