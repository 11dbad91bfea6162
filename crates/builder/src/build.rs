use crate::context::Context;
use crate::error::{ErrorKind, Result};
use crate::reconcile::{Outcome, reconcile};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use reldb_config::GameConfig;
use std::collections::HashSet;
use time::OffsetDateTime;

/// Progress events emitted by [`build`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. Per game, in configuration order: [`Discovered`](Self::Discovered) then
///    [`Reconciled`](Self::Reconciled), or an `Err` item scoped to the game
///    (see [`ErrorKind::game`]).
/// 3. [`IndexUpdated`](Self::IndexUpdated) exactly once, or an `Err` item if
///    the index could not be saved.
/// 4. [`Complete`](Self::Complete) exactly once.
#[derive(Debug)]
pub enum BuildEvent {
    Started { games: usize },
    Discovered { game: String, tags: usize },
    Reconciled { game: String, outcome: Outcome },
    /// Games whose version was stamped; empty if the index was left alone.
    IndexUpdated { updated: Vec<String> },
    Complete,
}

/// Streams [`BuildEvent`]s while bringing every game's release database up to
/// date, one game at a time.
///
/// A game whose tags cannot be discovered or whose state cannot be saved is
/// surfaced as an `Err` item without terminating the stream. Once all games
/// are done the version index is stamped for every game that succeeded.
pub fn build<'a>(
    ctx: &'a Context,
    games: &'a [GameConfig],
    fresh: &'a HashSet<String>,
) -> impl Stream<Item = Result<BuildEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(BuildEvent::Started { games: games.len() });

        let mut settled: Vec<(&str, bool)> = Vec::with_capacity(games.len());
        for game in games {
            let name = game.game_name.as_str();
            let tags = match ctx
                .tags
                .list_tags(&game.git_repo)
                .await
                .or_raise(|| ErrorKind::Discovery)
                .or_raise(|| ErrorKind::Game(name.to_string()))
            {
                Ok(tags) => tags,
                Err(e) => {
                    yield Err(e);
                    continue;
                },
            };
            yield Ok(BuildEvent::Discovered { game: name.to_string(), tags: tags.len() });

            match reconcile(ctx, game, &tags, fresh).await.or_raise(|| ErrorKind::Game(name.to_string())) {
                Ok((_state, outcome)) => {
                    settled.push((name, outcome.releases_changed()));
                    yield Ok(BuildEvent::Reconciled { game: name.to_string(), outcome });
                },
                Err(e) => yield Err(e),
            }
        }

        let mut index = ctx.store.load_index().await;
        let now = OffsetDateTime::now_utc();
        let updated: Vec<String> = settled
            .iter()
            .filter(|(game, changed)| index.update(game, *changed, now))
            .map(|(game, _)| game.to_string())
            .collect();
        if !updated.is_empty() {
            if let Err(e) = ctx.store.save_index(&index).await.or_raise(|| ErrorKind::Index) {
                yield Err(e);
                return;
            }
            tracing::info!(games = ?updated, "Version index updated");
        }
        yield Ok(BuildEvent::IndexUpdated { updated });

        yield Ok(BuildEvent::Complete);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeReleases, FakeTags, context, game, metadata};
    use futures::StreamExt;
    use reldb_cache::{CacheStore, VersionIndex};
    use reldb_storage::backend::MockBackend;
    use std::sync::Arc;

    async fn collect(ctx: &Context, games: &[GameConfig], fresh: &HashSet<String>) -> Vec<Result<BuildEvent>> {
        build(ctx, games, fresh).collect().await
    }

    #[tokio::test]
    async fn test_event_order_and_index() {
        let backend = Arc::new(MockBackend::default());
        let tags = FakeTags::default()
            .with_tags("owner/cdda", &["0.F", "0.G", "nightly"])
            .with_tags("owner/bn", &["v1"]);
        let releases = FakeReleases::new().with_release(metadata("0.G", &["cdda-windows-tiles-x64.zip"]));
        let ctx = context(backend.clone(), tags, releases);
        let games = vec![game("cdda", &[r"^0\.[A-Z]$"]), game("bn", &[r"^v[0-9]+$"])];

        let events = collect(&ctx, &games, &HashSet::new()).await;
        let events: Vec<BuildEvent> = events.into_iter().map(Result::unwrap).collect();
        assert!(matches!(events[0], BuildEvent::Started { games: 2 }));
        assert!(matches!(&events[1], BuildEvent::Discovered { game, tags: 3 } if game == "cdda"));
        match &events[2] {
            BuildEvent::Reconciled { game, outcome } => {
                assert_eq!(game, "cdda");
                assert_eq!(outcome.added, vec!["0.G"]);
                assert_eq!(outcome.failed, vec!["0.F"]);
            },
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(&events[3], BuildEvent::Discovered { game, tags: 1 } if game == "bn"));
        assert!(matches!(&events[4], BuildEvent::Reconciled { game, .. } if game == "bn"));
        match &events[5] {
            // bn has no new releases but no entry yet either.
            BuildEvent::IndexUpdated { updated } => assert_eq!(updated, &vec!["cdda", "bn"]),
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(events[6], BuildEvent::Complete));
        assert_eq!(events.len(), 7);

        let index = CacheStore::new(backend).load_index().await;
        assert!(index.version("cdda").is_some());
        assert!(index.version("bn").is_some());
    }

    #[tokio::test]
    async fn test_discovery_failure_only_affects_its_game() {
        let backend = Arc::new(MockBackend::default());
        let tags = FakeTags::default().with_tags("owner/bn", &["v1"]);
        let releases = FakeReleases::new().with_release(metadata("v1", &[]));
        let ctx = context(backend.clone(), tags, releases);
        let games = vec![game("cdda", &[r"^0\."]), game("bn", &[r"^v"])];

        let events = collect(&ctx, &games, &HashSet::new()).await;
        let failed: Vec<String> = events
            .iter()
            .filter_map(|event| event.as_ref().err())
            .filter_map(|err| err.game().map(str::to_string))
            .collect();
        assert_eq!(failed, vec!["cdda"]);
        assert!(events.iter().any(|event| matches!(event, Ok(BuildEvent::Reconciled { game, .. }) if game == "bn")));
        assert!(matches!(events.last(), Some(Ok(BuildEvent::Complete))));

        let index = CacheStore::new(backend).load_index().await;
        assert_eq!(index.version("cdda"), None);
        assert!(index.version("bn").is_some());
    }

    #[tokio::test]
    async fn test_index_only_moves_forward() {
        // An entry stamped in the future must survive a run with changes.
        let future = r#"{ "cdda": { "version": 4102444800 } }"#;
        let backend = Arc::new(MockBackend::with_blobs([("index.json", future)]));
        let tags = FakeTags::default().with_tags("owner/cdda", &["0.G"]);
        let releases = FakeReleases::new().with_release(metadata("0.G", &[]));
        let ctx = context(backend.clone(), tags, releases);
        let games = vec![game("cdda", &[r"^0\."])];

        let events = collect(&ctx, &games, &HashSet::new()).await;
        assert!(events.iter().all(Result::is_ok));
        let index = CacheStore::new(backend.clone()).load_index().await;
        assert_eq!(index.version("cdda"), Some(4_102_444_800));
    }

    #[tokio::test]
    async fn test_unchanged_run_writes_nothing() {
        let backend = Arc::new(MockBackend::default());
        let games = vec![game("cdda", &[r"^0\."])];
        let tags = FakeTags::default().with_tags("owner/cdda", &["0.G"]);
        let ctx = context(backend.clone(), tags.clone(), FakeReleases::new().with_release(metadata("0.G", &[])));
        collect(&ctx, &games, &HashSet::new()).await;
        let writes = backend.write_count();
        let version = CacheStore::new(backend.clone()).load_index().await.version("cdda");

        let releases = FakeReleases::new();
        let ctx = context(backend.clone(), tags, releases.clone());
        let events = collect(&ctx, &games, &HashSet::new()).await;
        assert!(releases.calls().is_empty());
        assert!(events.iter().any(|event| matches!(event, Ok(BuildEvent::IndexUpdated { updated }) if updated.is_empty())));
        assert_eq!(backend.write_count(), writes);
        assert_eq!(CacheStore::new(backend).load_index().await.version("cdda"), version);
    }

    #[tokio::test]
    async fn test_fresh_rebuild_that_loses_releases_bumps_the_index() {
        let backend = Arc::new(MockBackend::default());
        let games = vec![game("cdda", &[r"^0\."])];
        let tags = FakeTags::default().with_tags("owner/cdda", &["0.G"]);
        let ctx = context(backend.clone(), tags.clone(), FakeReleases::new().with_release(metadata("0.G", &[])));
        collect(&ctx, &games, &HashSet::new()).await;
        let store = CacheStore::new(backend.clone());
        let old: VersionIndex = serde_json::from_str(r#"{ "cdda": { "version": 1 } }"#).unwrap();
        store.save_index(&old).await.unwrap();

        // 0.G has since disappeared upstream.
        let ctx = context(backend.clone(), tags, FakeReleases::new());
        let fresh: HashSet<String> = ["cdda".to_string()].into();
        let events = collect(&ctx, &games, &fresh).await;
        assert!(events.iter().any(|event| matches!(event, Ok(BuildEvent::IndexUpdated { updated }) if updated == &vec!["cdda"])));
        let (_, releases) = store.read_releases("cdda").await.unwrap();
        assert!(releases.is_empty());
        assert!(store.load_index().await.version("cdda").unwrap() > 1);
    }

    #[tokio::test]
    async fn test_identical_fresh_rebuild_leaves_the_index_alone() {
        let backend = Arc::new(MockBackend::default());
        let games = vec![game("cdda", &[r"^0\."])];
        let tags = FakeTags::default().with_tags("owner/cdda", &["0.G"]);
        let releases = FakeReleases::new().with_release(metadata("0.G", &[]));
        let ctx = context(backend.clone(), tags, releases);
        collect(&ctx, &games, &HashSet::new()).await;
        let store = CacheStore::new(backend.clone());
        let old: VersionIndex = serde_json::from_str(r#"{ "cdda": { "version": 1 } }"#).unwrap();
        store.save_index(&old).await.unwrap();

        let fresh: HashSet<String> = ["cdda".to_string()].into();
        let events = collect(&ctx, &games, &fresh).await;
        assert!(events.iter().any(|event| matches!(event, Ok(BuildEvent::IndexUpdated { updated }) if updated.is_empty())));
        assert_eq!(store.load_index().await.version("cdda"), Some(1));
    }
}
