//! Collaborator Error Types

use derive_more::{Display, Error};

/// A tag-discovery or release-lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tag-discovery and release-lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("git executable not found in PATH")]
    GitNotFound,
    /// `git ls-remote` failed or returned something unusable.
    #[display("tag discovery failed for {_0}")]
    Discovery(#[error(not(source))] String),
    #[display("tag discovery for {_0} timed out")]
    DiscoveryTimeout(#[error(not(source))] String),
    /// The API budget is spent; `reset` is the Unix timestamp it refills at.
    #[display("GitHub API rate limit exhausted")]
    RateLimited {
        #[error(not(source))]
        reset: Option<i64>,
    },
    /// Transport failure or server-side (5xx) error.
    #[display("network error")]
    Network,
    /// Any other unexpected HTTP status.
    #[display("unexpected HTTP status {_0}")]
    Status(#[error(not(source))] u16),
    /// The response body could not be decoded.
    #[display("invalid response")]
    InvalidResponse,
    /// Client construction failed.
    #[display("invalid client configuration: {_0}")]
    Config(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network)
    }
}
