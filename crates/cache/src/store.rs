use exn::ResultExt;
use reldb_release::ReleaseRecord;
use reldb_storage::BackendHandle;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::index::VersionIndex;
use crate::keys::{GameKeys, INDEX_KEY, game_from_releases_key};
use crate::state::RepositoryCacheState;

/// Reads and writes the release database through a storage backend.
///
/// Loading is forgiving: a missing blob is simply empty, and a blob that
/// cannot be read or parsed is logged and treated as empty so that the next
/// run rebuilds it. Saving is strict.
#[derive(Clone)]
pub struct CacheStore {
    backend: BackendHandle,
}
impl CacheStore {
    pub fn new(backend: BackendHandle) -> Self {
        Self { backend }
    }

    async fn read_blob(&self, key: &Path) -> Result<Option<Vec<u8>>> {
        match self.backend.read(key).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err).or_raise(|| ErrorKind::Read(key.to_path_buf())),
        }
    }

    async fn read_lenient<T: DeserializeOwned + Default>(&self, key: &Path) -> T {
        let bytes = match self.read_blob(key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return T::default(),
            Err(err) => {
                tracing::warn!(key = %key.display(), error = %err, "Unreadable blob, treating as empty");
                return T::default();
            },
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key = %key.display(), error = %err, "Corrupt blob, treating as empty");
                T::default()
            },
        }
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &Path, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value).or_raise(|| ErrorKind::Serialize(key.to_path_buf()))?;
        self.backend.write(key, &bytes).await.or_raise(|| ErrorKind::Write(key.to_path_buf()))
    }

    // =========================================================================
    // Per-game state
    // =========================================================================

    /// Load a game's state. With `fresh`, nothing is read and the state starts
    /// empty.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn load(&self, game: &str, fresh: bool) -> Result<RepositoryCacheState> {
        let keys = GameKeys::new(game)?;
        if fresh {
            tracing::info!(game, "Fresh rebuild requested, ignoring cached state");
            return Ok(RepositoryCacheState::default());
        }
        let processed: BTreeSet<String> = self.read_lenient(&keys.processed).await;
        let failed: BTreeSet<String> = self.read_lenient(&keys.failed).await;
        let releases: Vec<ReleaseRecord> = self.read_lenient(&keys.releases).await;
        tracing::debug!(
            game,
            processed = processed.len(),
            failed = failed.len(),
            releases = releases.len(),
            "Loaded cached state"
        );
        Ok(RepositoryCacheState::from_parts(processed, failed, releases))
    }

    /// Persist a game's state.
    ///
    /// Releases go first and processed tags last, so an interrupted save can
    /// at worst leave a release whose tag is not yet recorded (repaired on the
    /// next load), never a processed tag without its release.
    #[instrument(skip(self, state), fields(backend = self.backend.name()))]
    pub async fn save(&self, game: &str, state: &RepositoryCacheState) -> Result<()> {
        let keys = GameKeys::new(game)?;
        self.write_json(&keys.releases, state.releases()).await?;
        self.write_json(&keys.failed, state.failed()).await?;
        self.write_json(&keys.processed, state.processed()).await?;
        tracing::debug!(
            game,
            processed = state.processed().len(),
            failed = state.failed().len(),
            releases = state.releases().len(),
            "Saved cached state"
        );
        Ok(())
    }

    // =========================================================================
    // Release lists (reprocessing)
    // =========================================================================

    /// Every game that has a release list in the database, sorted.
    pub async fn list_games(&self) -> Result<Vec<String>> {
        let blobs = self.backend.list(None).await.or_raise(|| ErrorKind::Read(PathBuf::new()))?;
        let games: BTreeSet<String> =
            blobs.iter().filter_map(|blob| game_from_releases_key(&blob.key)).map(str::to_string).collect();
        Ok(games.into_iter().collect())
    }

    /// Read a game's release list exactly as stored. Unlike [`load()`](Self::load)
    /// this fails on a missing or corrupt blob.
    pub async fn read_releases(&self, game: &str) -> Result<(Vec<u8>, Vec<ReleaseRecord>)> {
        let keys = GameKeys::new(game)?;
        let Some(bytes) = self.read_blob(&keys.releases).await? else {
            exn::bail!(ErrorKind::Read(keys.releases));
        };
        let releases = serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Corrupt(keys.releases.clone()))?;
        Ok((bytes, releases))
    }

    /// Keep a verbatim copy of a release list next to it.
    pub async fn backup_releases(&self, game: &str, bytes: &[u8]) -> Result<PathBuf> {
        let backup = GameKeys::new(game)?.releases_backup();
        self.backend.write(&backup, bytes).await.or_raise(|| ErrorKind::Write(backup.clone()))?;
        Ok(backup)
    }

    pub async fn save_releases(&self, game: &str, releases: &[ReleaseRecord]) -> Result<()> {
        let keys = GameKeys::new(game)?;
        self.write_json(&keys.releases, releases).await
    }

    // =========================================================================
    // Version index
    // =========================================================================

    pub async fn load_index(&self) -> VersionIndex {
        self.read_lenient(Path::new(INDEX_KEY)).await
    }

    pub async fn save_index(&self, index: &VersionIndex) -> Result<()> {
        self.write_json(Path::new(INDEX_KEY), index).await
    }
}
