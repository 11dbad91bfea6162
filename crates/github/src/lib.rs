//! The outside world, as seen by the database builder: a [`TagSource`] that
//! lists the tags of a repository and a [`ReleaseSource`] that resolves a tag
//! to its release metadata.

pub mod error;
mod git;
mod github;
mod source;

pub use crate::git::{GitLsRemote, parse_ls_remote};
pub use crate::github::{ClientOptions, GitHubClient, RateLimit};
pub use crate::source::{ReleaseSource, ReleaseSourceHandle, TagSource, TagSourceHandle};
