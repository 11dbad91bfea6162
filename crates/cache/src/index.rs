use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unix timestamp (seconds) of the last change to the game's releases.
    pub version: i64,
}

/// Shared `index.json` mapping game name to the version of its release list.
///
/// Downstream clients poll this one file to learn which release lists they
/// need to download again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionIndex(BTreeMap<String, IndexEntry>);
impl VersionIndex {
    pub fn version(&self, game: &str) -> Option<i64> {
        self.0.get(game).map(|entry| entry.version)
    }

    /// Stamp a new version for `game` if its releases changed or it has no
    /// entry yet. Versions never go backwards, even if the clock does.
    ///
    /// Returns `true` if the index was modified.
    pub fn update(&mut self, game: &str, changed: bool, now: OffsetDateTime) -> bool {
        let now = now.unix_timestamp();
        match self.0.get_mut(game) {
            Some(entry) if changed => {
                let version = now.max(entry.version);
                let modified = version != entry.version;
                entry.version = version;
                modified
            },
            Some(_) => false,
            None => {
                self.0.insert(game.to_string(), IndexEntry { version: now });
                true
            },
        }
    }
}
