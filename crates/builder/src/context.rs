use crate::retry::RetryPolicy;
use reldb_cache::CacheStore;
use reldb_github::{ReleaseSourceHandle, TagSourceHandle};
use std::time::Duration;

/// Everything a build needs besides the list of games.
pub struct Context {
    pub store: CacheStore,
    pub tags: TagSourceHandle,
    pub releases: ReleaseSourceHandle,
    pub retry: RetryPolicy,
    /// Pause between consecutive release lookups.
    pub request_delay: Duration,
}
impl Context {
    pub fn new(store: CacheStore, tags: TagSourceHandle, releases: ReleaseSourceHandle) -> Self {
        Self {
            store,
            tags,
            releases,
            retry: RetryPolicy::NONE,
            request_delay: Duration::ZERO,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}
