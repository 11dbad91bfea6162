//! Reclassifying stored releases after the classification rules change.

use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use reldb_cache::CacheStore;
use reldb_release::ReleaseRecord;
use serde_json::Value;
use std::path::PathBuf;
use time::OffsetDateTime;

/// Result of [`reprocess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reprocessed {
    pub releases: Vec<ReleaseRecord>,
    pub updated_assets: usize,
    pub total_assets: usize,
    /// The release list would be written differently than it is stored.
    pub stale: bool,
}
impl Reprocessed {
    pub fn changed(&self) -> bool {
        self.stale
    }
}

/// Recompute the classification of every asset. Nothing but the four
/// classification fields is touched.
pub fn reprocess(mut releases: Vec<ReleaseRecord>) -> Reprocessed {
    let total_assets = releases.iter().map(|release| release.assets.len()).sum();
    let updated_assets = releases.iter_mut().map(ReleaseRecord::reclassify).sum();
    Reprocessed {
        releases,
        updated_assets,
        total_assets,
        stale: updated_assets > 0,
    }
}

/// Like [`reprocess`], but judged against the stored bytes of the list.
///
/// An asset also counts as updated when it would be written differently than
/// it is stored, e.g. boolean labels or a missing `arch` from older databases.
/// Those read back as `Unknown` and would otherwise never be rewritten.
pub fn reprocess_stored(bytes: &[u8], releases: Vec<ReleaseRecord>) -> serde_json::Result<Reprocessed> {
    let stored: Vec<Value> = serde_json::from_slice(bytes)?;
    let mut reprocessed = reprocess(releases);
    let mut updated_assets = 0;
    for (i, release) in reprocessed.releases.iter().enumerate() {
        let stored_assets = stored
            .get(i)
            .and_then(|release| release.get("assets"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for (j, asset) in release.assets.iter().enumerate() {
            if stored_assets.get(j) != Some(&serde_json::to_value(asset)?) {
                updated_assets += 1;
            }
        }
    }
    reprocessed.updated_assets = updated_assets;
    reprocessed.stale = serde_json::to_vec_pretty(&reprocessed.releases)? != bytes;
    Ok(reprocessed)
}

#[derive(Debug)]
pub enum ReprocessEvent {
    Started { games: usize },
    Reprocessed {
        game: String,
        updated_assets: usize,
        total_assets: usize,
        /// Copy of the release list as it was before.
        backup: PathBuf,
    },
    IndexUpdated { updated: Vec<String> },
    Complete,
}

/// Streams [`ReprocessEvent`]s while reclassifying every release list in the
/// database.
///
/// Each list is backed up before anything else happens and only rewritten if
/// its stored bytes are out of date. A game that fails is surfaced as an `Err` item scoped to
/// it; failing to list the database at all ends the stream.
pub fn reprocess_all(store: &CacheStore) -> impl Stream<Item = Result<ReprocessEvent>> + '_ {
    stream!({
        let games = match store.list_games().await.or_raise(|| ErrorKind::Cache) {
            Ok(games) => games,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        yield Ok(ReprocessEvent::Started { games: games.len() });

        let mut settled = Vec::with_capacity(games.len());
        for game in games {
            match reprocess_game(store, &game).await.or_raise(|| ErrorKind::Game(game.clone())) {
                Ok((reprocessed, backup)) => {
                    settled.push((game.clone(), reprocessed.changed()));
                    yield Ok(ReprocessEvent::Reprocessed {
                        game,
                        updated_assets: reprocessed.updated_assets,
                        total_assets: reprocessed.total_assets,
                        backup,
                    });
                },
                Err(e) => yield Err(e),
            }
        }

        let mut index = store.load_index().await;
        let now = OffsetDateTime::now_utc();
        let updated: Vec<String> = settled
            .into_iter()
            .filter(|(game, changed)| index.update(game, *changed, now))
            .map(|(game, _)| game)
            .collect();
        if !updated.is_empty() {
            if let Err(e) = store.save_index(&index).await.or_raise(|| ErrorKind::Index) {
                yield Err(e);
                return;
            }
        }
        yield Ok(ReprocessEvent::IndexUpdated { updated });

        yield Ok(ReprocessEvent::Complete);
    })
}

#[tracing::instrument(skip(store))]
async fn reprocess_game(store: &CacheStore, game: &str) -> Result<(Reprocessed, PathBuf)> {
    let (bytes, releases) = store.read_releases(game).await.or_raise(|| ErrorKind::Cache)?;
    let backup = store.backup_releases(game, &bytes).await.or_raise(|| ErrorKind::Cache)?;
    let reprocessed = reprocess_stored(&bytes, releases).or_raise(|| ErrorKind::Cache)?;
    if reprocessed.changed() {
        store.save_releases(game, &reprocessed.releases).await.or_raise(|| ErrorKind::Cache)?;
    }
    tracing::info!(
        releases = reprocessed.releases.len(),
        updated = reprocessed.updated_assets,
        total = reprocessed.total_assets,
        "Reprocessed release list"
    );
    Ok((reprocessed, backup))
}
