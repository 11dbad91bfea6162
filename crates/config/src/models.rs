use reldb_release::TagFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Games to build release databases for, processed in this order.
    pub games: Vec<GameConfig>,
    /// Root directory of the release database.
    #[serde(default = "default_database_dir")]
    pub database_dir: PathBuf,
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Short name, used as the directory and file prefix in the database and
    /// as the `game_type` of every release.
    pub game_name: String,
    /// Repository in `owner/name` form.
    pub git_repo: String,
    /// Tags matching any of these patterns are looked up.
    pub filters: TagFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    /// Base URL that `git ls-remote` is pointed at.
    pub git_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    /// Pause between consecutive release lookups.
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub discovery_timeout_secs: u64,
    /// Sleep until the rate limit resets once fewer requests than this remain.
    pub rate_limit_floor: u32,
    /// Upper bound on a single rate-limit sleep.
    pub max_rate_limit_wait_secs: u64,
    pub retry: RetryConfig,
}
impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            git_url: "https://github.com".to_string(),
            token: None,
            user_agent: concat!("reldb/", env!("CARGO_PKG_VERSION")).to_string(),
            request_delay_ms: 100,
            timeout_secs: 30,
            discovery_timeout_secs: 60,
            rate_limit_floor: 10,
            max_rate_limit_wait_secs: 3600,
            retry: RetryConfig::default(),
        }
    }
}
impl GitHubConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }

    pub fn max_rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.max_rate_limit_wait_secs)
    }
}

/// Exponential backoff for transient lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per tag, including the first.
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}
impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
        }
    }
}

fn default_database_dir() -> PathBuf {
    PathBuf::from("db")
}
