mod error;
mod summary;

use crate::error::{ErrorKind, Result};
use crate::summary::{BuildSummary, ReprocessSummary, log_rate_limit};
use clap::Parser;
use exn::ResultExt;
use futures::{StreamExt, pin_mut};
use reldb_builder::{Context, build, reprocess_all};
use reldb_cache::CacheStore;
use reldb_config::Config;
use reldb_github::{ClientOptions, GitHubClient, GitLsRemote};
use reldb_storage::BackendHandle;
use reldb_storage::backend::{LocalBackend, ReadOnlyBackend};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const CRATES: &[&str] = &[
    "reldb",
    "reldb_builder",
    "reldb_cache",
    "reldb_config",
    "reldb_github",
    "reldb_release",
    "reldb_storage",
];

/// Build and incrementally maintain a JSON database of GitHub releases.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (JSON, TOML or YAML).
    config: PathBuf,
    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
    /// Games whose cached state is discarded and rebuilt.
    #[arg(long, value_delimiter = ',', value_name = "GAME,...")]
    fresh: Vec<String>,
    /// Do everything except writing to the database.
    #[arg(long)]
    dry_run: bool,
    /// Reclassify the assets of every stored release instead of building.
    #[arg(long)]
    reprocess: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!(error = ?err, "{err}");
            ExitCode::FAILURE
        },
    }
}

/// `RUST_LOG` wins; otherwise our own crates log at `info` (or `debug`) and
/// everything else only warns.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let directives = std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|krate| format!("{krate}={level}")))
        .collect::<Vec<_>>()
        .join(",");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

async fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::load(&cli.config).or_raise(|| ErrorKind::Config)?;
    if let Some(token) = cli.token {
        config.github.token = Some(token);
    }

    let root = std::path::absolute(&config.database_dir).or_raise(|| ErrorKind::Storage)?;
    let local = LocalBackend::new("local", &root).or_raise(|| ErrorKind::Storage)?;
    let backend: BackendHandle = if cli.dry_run {
        tracing::info!(root = %root.display(), "Dry run, the database will not be modified");
        Arc::new(ReadOnlyBackend::new(Arc::new(local)))
    } else {
        Arc::new(local)
    };
    let store = CacheStore::new(backend);

    if cli.reprocess {
        return reprocess(&store).await;
    }

    let fresh: HashSet<String> = cli.fresh.into_iter().map(|game| game.trim().to_string()).collect();
    for game in &fresh {
        if config.game(game).is_none() {
            tracing::warn!(game = %game, "Fresh rebuild requested for a game that is not configured");
        }
    }

    let github = &config.github;
    let tags = GitLsRemote::discover(&github.git_url, github.discovery_timeout()).or_raise(|| ErrorKind::Sources)?;
    let client = Arc::new(GitHubClient::new(ClientOptions {
        api_url: github.api_url.clone(),
        token: github.token.clone(),
        user_agent: github.user_agent.clone(),
        timeout: github.timeout(),
        rate_limit_floor: github.rate_limit_floor,
        max_rate_limit_wait: github.max_rate_limit_wait(),
    })
    .or_raise(|| ErrorKind::Sources)?);
    let ctx = Context::new(store, Arc::new(tags), client.clone())
        .with_retry(github.retry.into())
        .with_request_delay(github.request_delay());

    let mut summary = BuildSummary::default();
    let events = build(&ctx, &config.games, &fresh);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        summary.record(event);
    }
    summary.log();
    log_rate_limit(&client.rate_limit().await);
    Ok(summary.is_success())
}

async fn reprocess(store: &CacheStore) -> Result<bool> {
    let mut summary = ReprocessSummary::default();
    let events = reprocess_all(store);
    pin_mut!(events);
    while let Some(event) = events.next().await {
        summary.record(event);
    }
    summary.log();
    Ok(summary.is_success())
}
