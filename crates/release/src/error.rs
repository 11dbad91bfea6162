//! Release Error Types

use derive_more::{Display, Error};

/// A release-model error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for release-model operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A tag filter pattern is not a valid regular expression.
    #[display("invalid tag filter pattern '{pattern}': {reason}")]
    InvalidPattern {
        pattern: String,
        reason: String,
    },
    /// A value could not be parsed into one of the release enums.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        field: &'static str,
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Patterns and labels are either valid or they aren't.
        false
    }
}
