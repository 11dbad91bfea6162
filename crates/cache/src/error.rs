//! Cache Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The game name cannot be turned into blob keys.
    #[display("invalid game name: {_0}")]
    InvalidGameName(#[error(not(source))] String),
    #[display("failed to read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("failed to write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// The blob exists but does not hold the expected JSON.
    #[display("corrupt blob: {}", _0.display())]
    Corrupt(#[error(not(source))] PathBuf),
    /// Serialization error.
    #[display("failed to serialize {}", _0.display())]
    Serialize(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_))
    }
}
