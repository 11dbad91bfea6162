//! Persistent per-game state for the release database.
//!
//! The database is the source of truth for what has already been looked up:
//! which tags produced a release, which tags have no release, and the
//! release records themselves. A shared version index lets downstream
//! clients see which games changed without downloading every release list.
//!
//! Nothing here keeps global state. A [`RepositoryCacheState`] is loaded,
//! owned by whoever is processing that game, and handed back to
//! [`CacheStore::save`].

pub mod error;
mod index;
mod keys;
mod state;
mod store;

pub use crate::index::{IndexEntry, VersionIndex};
pub use crate::keys::{GameKeys, INDEX_KEY};
pub use crate::state::RepositoryCacheState;
pub use crate::store::CacheStore;
