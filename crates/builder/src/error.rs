//! Builder Error Types

use derive_more::{Display, Error};

/// A builder error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a builder failure.
///
/// ### Per-game Errors
/// - [`ErrorKind::Game`] wraps whatever stopped one game; the other games
///   carry on.
///
/// ### Dependency Errors
/// - [`ErrorKind::Discovery`]
/// - [`ErrorKind::Cache`]
/// - [`ErrorKind::Index`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Processing of the named game failed.
    #[display("failed to process {_0}")]
    Game(#[error(not(source))] String),
    /// Tags could not be listed.
    #[display("tag discovery failed")]
    Discovery,
    /// Loading or saving cached state failed.
    #[display("cache operation failed")]
    Cache,
    /// The shared version index could not be saved.
    #[display("failed to save the version index")]
    Index,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            _ => false,
        }
    }

    /// Name of the failed game, if the error is scoped to one.
    pub fn game(&self) -> Option<&str> {
        match self {
            Self::Game(game) => Some(game),
            _ => None,
        }
    }
}
