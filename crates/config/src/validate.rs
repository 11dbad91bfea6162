use std::collections::HashSet;

use crate::error::{ErrorKind, Result};
use crate::models::Config;

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub(crate) fn validate(config: &Config) -> Result<()> {
    if config.games.is_empty() {
        exn::bail!(ErrorKind::Invalid("no games configured".to_string()));
    }
    let mut seen = HashSet::new();
    for game in &config.games {
        if !is_safe_segment(&game.game_name) {
            exn::bail!(ErrorKind::Invalid(format!(
                "game name '{}' may only contain letters, digits, '-', '_' and '.'",
                game.game_name
            )));
        }
        if !seen.insert(game.game_name.as_str()) {
            exn::bail!(ErrorKind::Invalid(format!("game name '{}' is configured twice", game.game_name)));
        }
        let repo_ok = match game.git_repo.split_once('/') {
            Some((owner, name)) => is_safe_segment(owner) && is_safe_segment(name),
            None => false,
        };
        if !repo_ok {
            exn::bail!(ErrorKind::Invalid(format!(
                "git_repo '{}' of '{}' is not in owner/name form",
                game.git_repo, game.game_name
            )));
        }
        if game.filters.is_empty() {
            tracing::warn!(game = %game.game_name, "No tag filters configured, no tags will be processed");
        }
    }
    if config.github.retry.attempts == 0 {
        exn::bail!(ErrorKind::Invalid("github.retry.attempts must be at least 1".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GameConfig, GitHubConfig};
    use reldb_release::TagFilter;
    use rstest::rstest;
    use std::path::PathBuf;

    fn config(games: &[(&str, &str)]) -> Config {
        Config {
            games: games
                .iter()
                .map(|(name, repo)| GameConfig {
                    game_name: name.to_string(),
                    git_repo: repo.to_string(),
                    filters: TagFilter::new([r"^0\.[A-Z]$"]).unwrap(),
                })
                .collect(),
            database_dir: PathBuf::from("db"),
            github: GitHubConfig::default(),
        }
    }

    #[test]
    fn test_valid() {
        let config = config(&[("cdda", "CleverRaven/Cataclysm-DDA"), ("bn", "cataclysmbnteam/Cataclysm-BN")]);
        assert!(validate(&config).is_ok());
    }

    #[rstest]
    #[case(&[])]
    #[case(&[("cdda", "CleverRaven/Cataclysm-DDA"), ("cdda", "cataclysmbnteam/Cataclysm-BN")])]
    #[case(&[("../cdda", "CleverRaven/Cataclysm-DDA")])]
    #[case(&[("cd da", "CleverRaven/Cataclysm-DDA")])]
    #[case(&[("", "CleverRaven/Cataclysm-DDA")])]
    #[case(&[("cdda", "Cataclysm-DDA")])]
    #[case(&[("cdda", "CleverRaven/Cataclysm-DDA/extra")])]
    #[case(&[("cdda", "https://github.com/CleverRaven/Cataclysm-DDA")])]
    #[case(&[("cdda", "/Cataclysm-DDA")])]
    fn test_invalid(#[case] games: &[(&str, &str)]) {
        let err = validate(&config(games)).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = config(&[("cdda", "CleverRaven/Cataclysm-DDA")]);
        config.github.retry.attempts = 0;
        assert!(validate(&config).is_err());
    }
}
