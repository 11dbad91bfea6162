//! Blob layout of the release database.
//!
//! ```text
//! index.json
//! {game}/{game}_releases.json
//! {game}/{game}_processed_tags.json
//! {game}/{game}_failed_tags.json
//! ```

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

pub const INDEX_KEY: &str = "index.json";
const RELEASES_SUFFIX: &str = "_releases.json";
const PROCESSED_SUFFIX: &str = "_processed_tags.json";
const FAILED_SUFFIX: &str = "_failed_tags.json";
const BACKUP_SUFFIX: &str = ".backup";

/// The blob keys belonging to one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameKeys {
    pub releases: PathBuf,
    pub processed: PathBuf,
    pub failed: PathBuf,
}
impl GameKeys {
    /// Game names become a directory and a filename prefix, so they must be
    /// a single plain path component.
    pub fn new(game: &str) -> Result<Self> {
        let mut components = Path::new(game).components();
        let single_normal = matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none();
        if game.is_empty() || !single_normal || game.contains(['/', '\\', '\0']) {
            exn::bail!(ErrorKind::InvalidGameName(game.to_string()));
        }
        let dir = Path::new(game);
        Ok(Self {
            releases: dir.join(format!("{game}{RELEASES_SUFFIX}")),
            processed: dir.join(format!("{game}{PROCESSED_SUFFIX}")),
            failed: dir.join(format!("{game}{FAILED_SUFFIX}")),
        })
    }

    /// Where the previous release list is copied before reprocessing.
    pub fn releases_backup(&self) -> PathBuf {
        let mut backup = self.releases.clone().into_os_string();
        backup.push(BACKUP_SUFFIX);
        PathBuf::from(backup)
    }
}

/// Recover the game name from a `{game}/{game}_releases.json` key.
pub fn game_from_releases_key(key: &Path) -> Option<&str> {
    let dir = key.parent()?.to_str()?;
    let file = key.file_name()?.to_str()?;
    let game = file.strip_suffix(RELEASES_SUFFIX)?;
    (game == dir && !game.is_empty()).then_some(game)
}
