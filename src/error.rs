//! Application Error Types

use derive_more::{Display, Error};

/// An application error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for application setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that stop a run before any game is processed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not open the database directory")]
    Storage,
    /// Tag discovery or the API client could not be set up.
    #[display("could not set up the release sources")]
    Sources,
}
