//! Configuration loading and validation.
//!
//! Configuration comes from a single file (JSON, TOML or YAML, picked by
//! extension) with `RELDB_`-prefixed environment variables layered on top.
//! Nested keys are separated by a double underscore, so
//! `RELDB_GITHUB__TOKEN` sets `github.token`.
//!
//! ```json
//! {
//!   "games": [
//!     { "game_name": "cdda", "git_repo": "CleverRaven/Cataclysm-DDA", "filters": ["^0\\.[A-Z]$"] }
//!   ],
//!   "github": { "request_delay_ms": 250 }
//! }
//! ```

pub mod error;
mod models;
mod validate;

pub use crate::models::{Config, GameConfig, GitHubConfig, RetryConfig};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use std::path::Path;

pub const ENV_PREFIX: &str = "RELDB_";

impl Config {
    /// Load, merge and validate the configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
        }
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        let figment = match extension.as_deref() {
            Some("json") => Figment::from(Json::file_exact(path)),
            Some("toml") => Figment::from(Toml::file_exact(path)),
            Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
        let config = Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))?;
        tracing::debug!(path = %path.display(), games = config.games.len(), "Loaded configuration");
        Ok(config)
    }

    /// Extract and validate a configuration from any figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Malformed)?;
        validate::validate(&config)?;
        Ok(config)
    }

    pub fn game(&self, name: &str) -> Option<&GameConfig> {
        self.games.iter().find(|game| game.game_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::path::PathBuf;

    const JSON: &str = r#"{
        "games": [
            { "game_name": "cdda", "git_repo": "CleverRaven/Cataclysm-DDA", "filters": ["^0\\.[A-Z]$"] },
            { "game_name": "bn", "git_repo": "cataclysmbnteam/Cataclysm-BN", "filters": ["^v?[0-9.]+$"] }
        ]
    }"#;

    #[test]
    fn test_load_json_with_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("reldb.json", JSON)?;
            let config = Config::load("reldb.json").map_err(|e| e.to_string())?;
            assert_eq!(config.games.len(), 2);
            assert_eq!(config.games[0].game_name, "cdda");
            assert!(config.games[0].filters.matches("0.G"));
            assert_eq!(config.database_dir, PathBuf::from("db"));
            assert_eq!(config.github, GitHubConfig::default());
            assert_eq!(config.github.retry.attempts, 3);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reldb.toml",
                r#"
                    database_dir = "out"

                    [[games]]
                    game_name = "tlg"
                    git_repo = "Cataclysm-TLG/Cataclysm-TLG"
                    filters = ["^[0-9]"]

                    [github]
                    request_delay_ms = 0
                    retry = { attempts = 5 }
                "#,
            )?;
            let config = Config::load("reldb.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.database_dir, PathBuf::from("out"));
            assert_eq!(config.github.request_delay_ms, 0);
            assert_eq!(config.github.retry.attempts, 5);
            assert_eq!(config.github.retry.base_delay_ms, 1000);
            assert!(config.game("tlg").is_some());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("reldb.json", JSON)?;
            jail.set_env("RELDB_DATABASE_DIR", "elsewhere");
            jail.set_env("RELDB_GITHUB__TOKEN", "secret");
            let config = Config::load("reldb.json").map_err(|e| e.to_string())?;
            assert_eq!(config.database_dir, PathBuf::from("elsewhere"));
            assert_eq!(config.github.token.as_deref(), Some("secret"));
            Ok(())
        });
    }

    #[test]
    fn test_invalid_regex_is_malformed() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reldb.json",
                r#"{ "games": [{ "game_name": "cdda", "git_repo": "a/b", "filters": ["^[0-9"] }] }"#,
            )?;
            let err = Config::load("reldb.json").unwrap_err();
            assert!(matches!(&*err, ErrorKind::Malformed));
            Ok(())
        });
    }

    #[test]
    fn test_missing_field_is_malformed() {
        Jail::expect_with(|jail| {
            jail.create_file("reldb.json", r#"{ "games": [{ "game_name": "cdda", "filters": [] }] }"#)?;
            let err = Config::load("reldb.json").unwrap_err();
            assert!(matches!(&*err, ErrorKind::Malformed));
            Ok(())
        });
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/definitely/not/here/reldb.json").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("reldb.ini", "games=")?;
            let err = Config::load("reldb.ini").unwrap_err();
            assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }
}
