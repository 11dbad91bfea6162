use reldb_builder::error::Error as BuilderError;
use reldb_builder::{BuildEvent, ReprocessEvent};
use reldb_github::RateLimit;

/// End-of-run tally of a build.
#[derive(Debug, Default)]
pub(crate) struct BuildSummary {
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
    pub failed: Vec<String>,
    /// Lookups left for the next run across all games.
    pub deferred: usize,
    /// Something went wrong that is not tied to one game (the index).
    pub other_errors: usize,
}
impl BuildSummary {
    pub fn record(&mut self, event: Result<BuildEvent, BuilderError>) {
        match event {
            Ok(BuildEvent::Reconciled { game, outcome }) => {
                self.deferred += outcome.deferred.len();
                if outcome.changed() {
                    self.changed.push(game);
                } else {
                    self.unchanged.push(game);
                }
            },
            Ok(_) => {},
            Err(err) => {
                tracing::error!(error = ?err, "{err}");
                match err.game() {
                    Some(game) => self.failed.push(game.to_string()),
                    None => self.other_errors += 1,
                }
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.other_errors == 0
    }

    pub fn log(&self) {
        tracing::info!(
            changed = ?self.changed,
            unchanged = ?self.unchanged,
            failed = ?self.failed,
            deferred = self.deferred,
            "Build finished"
        );
    }
}

/// End-of-run tally of a reprocessing pass.
#[derive(Debug, Default)]
pub(crate) struct ReprocessSummary {
    pub processed: usize,
    pub failed: usize,
    pub updated_assets: usize,
    pub total_assets: usize,
    pub other_errors: usize,
}
impl ReprocessSummary {
    pub fn record(&mut self, event: Result<ReprocessEvent, BuilderError>) {
        match event {
            Ok(ReprocessEvent::Reprocessed {
                updated_assets,
                total_assets,
                ..
            }) => {
                self.processed += 1;
                self.updated_assets += updated_assets;
                self.total_assets += total_assets;
            },
            Ok(_) => {},
            Err(err) => {
                tracing::error!(error = ?err, "{err}");
                if err.game().is_some() {
                    self.failed += 1;
                } else {
                    self.other_errors += 1;
                }
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.other_errors == 0
    }

    pub fn log(&self) {
        tracing::info!(
            processed = self.processed,
            failed = self.failed,
            updated_assets = self.updated_assets,
            total_assets = self.total_assets,
            "Reprocessing finished"
        );
    }
}

/// API budget left after a build.
pub(crate) fn log_rate_limit(rate: &RateLimit) {
    if !rate.is_known() {
        tracing::debug!(authenticated = rate.authenticated, "No GitHub API requests were made");
        return;
    }
    tracing::info!(
        remaining = ?rate.remaining,
        limit = ?rate.limit,
        reset = ?rate.reset,
        authenticated = rate.authenticated,
        "GitHub rate limit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use reldb_builder::Outcome;
    use reldb_builder::error::ErrorKind as BuilderErrorKind;
    use std::path::PathBuf;

    fn reconciled(game: &str, added: &[&str], deferred: &[&str]) -> BuildEvent {
        BuildEvent::Reconciled {
            game: game.to_string(),
            outcome: Outcome {
                added: added.iter().map(|tag| tag.to_string()).collect(),
                deferred: deferred.iter().map(|tag| tag.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_build_summary() {
        let mut summary = BuildSummary::default();
        summary.record(Ok(BuildEvent::Started { games: 3 }));
        summary.record(Ok(reconciled("cdda", &["0.G"], &[])));
        summary.record(Ok(reconciled("bn", &[], &["v2", "v3"])));
        assert!(summary.is_success());
        summary.record(Err(BuilderError::from(BuilderErrorKind::Game("tlg".to_string()))));
        summary.record(Ok(BuildEvent::Complete));

        assert_eq!(summary.changed, vec!["cdda"]);
        assert_eq!(summary.unchanged, vec!["bn"]);
        assert_eq!(summary.failed, vec!["tlg"]);
        assert_eq!(summary.deferred, 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_index_failure_is_not_success() {
        let mut summary = BuildSummary::default();
        summary.record(Ok(reconciled("cdda", &["0.G"], &[])));
        summary.record(Err(BuilderError::from(BuilderErrorKind::Index)));
        assert!(summary.failed.is_empty());
        assert!(!summary.is_success());
    }

    #[test]
    fn test_reprocess_summary() {
        let mut summary = ReprocessSummary::default();
        for (game, updated, total) in [("cdda", 3, 10), ("bn", 0, 4)] {
            summary.record(Ok(ReprocessEvent::Reprocessed {
                game: game.to_string(),
                updated_assets: updated,
                total_assets: total,
                backup: PathBuf::from(format!("{game}/{game}_releases.json.backup")),
            }));
        }
        assert!(summary.is_success());
        summary.record(Err(BuilderError::from(BuilderErrorKind::Game("broken".to_string()))));
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.updated_assets, 3);
        assert_eq!(summary.total_assets, 14);
        assert!(!summary.is_success());
    }
}
