//! The incremental pipeline: discover tags, reconcile them against the cached
//! state of each game, look up and classify what is new, and stamp the
//! version index for whatever changed.
//!
//! The primary entry point is [`build`], which streams [`BuildEvent`]s for a
//! list of games. [`reprocess_all`] reclassifies an existing database in place
//! after the classification rules changed.

mod build;
mod context;
pub mod error;
mod reconcile;
mod reprocess;
mod retry;
#[cfg(test)]
mod testing;

pub use crate::build::{BuildEvent, build};
pub use crate::context::Context;
pub use crate::reconcile::{Outcome, candidate_tags, reconcile};
pub use crate::reprocess::{ReprocessEvent, Reprocessed, reprocess, reprocess_all, reprocess_stored};
pub use crate::retry::RetryPolicy;
