//! Scripted collaborators for tests.

use crate::context::Context;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reldb_cache::CacheStore;
use reldb_config::GameConfig;
use reldb_github::error::{Error as LookupError, ErrorKind as LookupErrorKind, Result as LookupResult};
use reldb_github::{ReleaseSource, TagSource};
use reldb_release::{AssetMetadata, ReleaseMetadata, TagFilter};
use reldb_storage::backend::MockBackend;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn game(name: &str, filters: &[&str]) -> GameConfig {
    GameConfig {
        game_name: name.to_string(),
        git_repo: format!("owner/{name}"),
        filters: TagFilter::new(filters.iter().copied()).unwrap(),
    }
}

pub(crate) fn metadata(tag: &str, assets: &[&str]) -> ReleaseMetadata {
    ReleaseMetadata {
        id: 1,
        name: tag.to_string(),
        tag_name: tag.to_string(),
        published_at: None,
        created_at: None,
        body: None,
        prerelease: false,
        assets: assets
            .iter()
            .map(|name| AssetMetadata {
                name: name.to_string(),
                download_url: format!("https://example.invalid/{tag}/{name}"),
                size: 1,
                created_at: None,
                updated_at: None,
            })
            .collect(),
    }
}

/// Two attempts per lookup and no sleeping.
pub(crate) fn context(backend: Arc<MockBackend>, tags: FakeTags, releases: FakeReleases) -> Context {
    Context::new(CacheStore::new(backend), Arc::new(tags), Arc::new(releases)).with_retry(RetryPolicy {
        attempts: 2,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    })
}

/// Tags per repository; unknown repositories fail discovery.
#[derive(Default, Clone)]
pub(crate) struct FakeTags {
    tags: HashMap<String, Vec<String>>,
}
impl FakeTags {
    pub(crate) fn with_tags(mut self, repo: &str, tags: &[&str]) -> Self {
        self.tags.insert(repo.to_string(), tags.iter().map(|tag| tag.to_string()).collect());
        self
    }
}
#[async_trait]
impl TagSource for FakeTags {
    async fn list_tags(&self, repo: &str) -> LookupResult<Vec<String>> {
        self.tags
            .get(repo)
            .cloned()
            .ok_or_else(|| LookupError::from(LookupErrorKind::Discovery(repo.to_string())))
    }
}

/// Releases by tag; unknown tags have no release. Every lookup is recorded.
#[derive(Default, Clone)]
pub(crate) struct FakeReleases {
    releases: HashMap<String, Result<ReleaseMetadata, LookupErrorKind>>,
    calls: Arc<Mutex<Vec<String>>>,
}
impl FakeReleases {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_release(mut self, release: ReleaseMetadata) -> Self {
        self.releases.insert(release.tag_name.clone(), Ok(release));
        self
    }

    /// Answer lookups of `tag` with a release that carries another tag.
    pub(crate) fn with_release_at(mut self, tag: &str, release: ReleaseMetadata) -> Self {
        self.releases.insert(tag.to_string(), Ok(release));
        self
    }

    pub(crate) fn with_error(mut self, tag: &str, kind: LookupErrorKind) -> Self {
        self.releases.insert(tag.to_string(), Err(kind));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}
#[async_trait]
impl ReleaseSource for FakeReleases {
    async fn release_by_tag(&self, _repo: &str, tag: &str) -> LookupResult<Option<ReleaseMetadata>> {
        self.calls.lock().unwrap().push(tag.to_string());
        match self.releases.get(tag) {
            Some(Ok(release)) => Ok(Some(release.clone())),
            Some(Err(kind)) => Err(LookupError::from(kind.clone())),
            None => Ok(None),
        }
    }
}
