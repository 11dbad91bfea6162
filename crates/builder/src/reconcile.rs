use crate::context::Context;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reldb_cache::RepositoryCacheState;
use reldb_config::GameConfig;
use reldb_release::ReleaseRecord;
use std::collections::HashSet;
use tracing::instrument;

/// What one reconciliation pass did to a game's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The cached state was ignored and rebuilt from scratch.
    pub fresh: bool,
    /// Tags that passed the filters.
    pub candidates: usize,
    /// Tags that produced a new release, in discovery order.
    pub added: Vec<String>,
    /// Tags newly recorded as having no release.
    pub failed: Vec<String>,
    /// Tags whose lookup failed; they stay unseen and are tried again next run.
    pub deferred: Vec<String>,
    /// After a fresh rebuild: the release list differs from the one stored
    /// before.
    pub replaced: bool,
}
impl Outcome {
    /// Whether the saved release list differs from the previous one.
    pub fn releases_changed(&self) -> bool {
        if self.fresh {
            self.replaced
        } else {
            !self.added.is_empty()
        }
    }

    /// Whether the persisted state differs from what was loaded.
    pub fn changed(&self) -> bool {
        self.releases_changed() || !self.failed.is_empty()
    }
}

/// Tags accepted by the game's filters, in discovery order and without
/// duplicates.
pub fn candidate_tags<S: AsRef<str>>(game: &GameConfig, discovered: &[S]) -> Vec<String> {
    game.filters.filter(discovered)
}

/// Bring one game's cached state up to date with the discovered tags.
///
/// Only tags that are neither processed nor failed are looked up. The state
/// is saved when it changed, or always after a fresh rebuild so the stale
/// blobs get replaced.
#[instrument(skip(ctx, game, discovered, fresh), fields(game = %game.game_name, repo = %game.git_repo))]
pub async fn reconcile<S: AsRef<str>>(
    ctx: &Context,
    game: &GameConfig,
    discovered: &[S],
    fresh: &HashSet<String>,
) -> Result<(RepositoryCacheState, Outcome)> {
    let name = game.game_name.as_str();
    let mut outcome = Outcome {
        fresh: fresh.contains(name),
        ..Default::default()
    };
    let previous = if outcome.fresh {
        Some(ctx.store.load(name, false).await.or_raise(|| ErrorKind::Cache)?)
    } else {
        None
    };
    let mut state = ctx.store.load(name, outcome.fresh).await.or_raise(|| ErrorKind::Cache)?;

    let candidates = candidate_tags(game, discovered);
    outcome.candidates = candidates.len();
    let new_tags: Vec<String> = state.unseen(candidates.as_slice()).into_iter().map(str::to_string).collect();
    tracing::info!(
        discovered = discovered.len(),
        candidates = candidates.len(),
        new = new_tags.len(),
        "Reconciling tags"
    );

    for (i, tag) in new_tags.into_iter().enumerate() {
        if i > 0 && !ctx.request_delay.is_zero() {
            tokio::time::sleep(ctx.request_delay).await;
        }
        let lookup = ctx.retry.run(|| ctx.releases.release_by_tag(&game.git_repo, &tag)).await;
        match lookup {
            Ok(Some(metadata)) => {
                let release = ReleaseRecord::from_metadata(metadata, name);
                let returned = release.tag_name.clone();
                let assets = release.assets.len();
                if state.record_release(release) {
                    tracing::info!(tag = %returned, assets, "Added release");
                    outcome.added.push(returned.clone());
                } else {
                    tracing::warn!(tag = %returned, "Release already recorded under this tag");
                }
                // The requested tag has no release of its own.
                if returned != tag {
                    tracing::warn!(tag = %tag, returned = %returned, "Release reports a different tag");
                    if state.record_failed(tag.as_str()) {
                        outcome.failed.push(tag);
                    }
                }
            },
            Ok(None) => {
                tracing::info!(tag = %tag, "No release for tag");
                if state.record_failed(tag.as_str()) {
                    outcome.failed.push(tag);
                }
            },
            Err(err) => {
                tracing::warn!(tag = %tag, error = %err, retryable = err.is_retryable(), "Lookup failed, deferring tag");
                outcome.deferred.push(tag);
            },
        }
    }

    if let Some(previous) = previous {
        outcome.replaced = previous.releases() != state.releases();
    }
    if outcome.changed() || outcome.fresh {
        ctx.store.save(name, &state).await.or_raise(|| ErrorKind::Cache)?;
    }
    tracing::info!(
        added = outcome.added.len(),
        failed = outcome.failed.len(),
        deferred = outcome.deferred.len(),
        "Reconciled"
    );
    Ok((state, outcome))
}
