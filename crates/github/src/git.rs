use crate::error::{ErrorKind, Result};
use crate::source::TagSource;
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const TAG_PREFIX: &str = "refs/tags/";
const PEELED_SUFFIX: &str = "^{}";

/// Discovers tags with `git ls-remote`, which costs nothing against the API
/// rate limit.
#[derive(Debug, Clone)]
pub struct GitLsRemote {
    git: PathBuf,
    base_url: String,
    timeout: Duration,
}
impl GitLsRemote {
    pub fn discover(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        match which::which("git") {
            Ok(git) => Ok(Self::with_executable(git, base_url, timeout)),
            Err(_) => {
                tracing::info!("git executable not found in PATH");
                exn::bail!(ErrorKind::GitNotFound);
            },
        }
    }

    pub fn with_executable(git: impl Into<PathBuf>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            git: git.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn remote_url(&self, repo: &str) -> String {
        format!("{}/{repo}.git", self.base_url)
    }
}

#[async_trait]
impl TagSource for GitLsRemote {
    #[tracing::instrument(skip(self))]
    async fn list_tags(&self, repo: &str) -> Result<Vec<String>> {
        let url = self.remote_url(repo);
        let output = Command::new(&self.git)
            .args(["ls-remote", "--tags", &url])
            // Never block on a credential prompt for a missing repository.
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = match tokio::time::timeout(self.timeout, output).await {
            Ok(output) => output.or_raise(|| ErrorKind::Discovery(repo.to_string()))?,
            Err(_) => exn::bail!(ErrorKind::DiscoveryTimeout(repo.to_string())),
        };
        if !output.status.success() {
            tracing::warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git ls-remote failed"
            );
            exn::bail!(ErrorKind::Discovery(repo.to_string()));
        }
        let tags = parse_ls_remote(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(count = tags.len(), "Discovered tags");
        Ok(tags)
    }
}

/// Extract tag names from `git ls-remote --tags` output.
///
/// Peeled entries (`refs/tags/x^{}`) are dropped; order is preserved and each
/// tag appears once.
pub fn parse_ls_remote(stdout: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .filter_map(|line| {
            let (_, tag) = line.split_once(TAG_PREFIX)?;
            let tag = tag.trim();
            (!tag.is_empty() && !tag.ends_with(PEELED_SUFFIX)).then_some(tag)
        })
        .filter(|tag| seen.insert(*tag))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const OUTPUT: &str = "\
8f3c2d1e0a9b8c7d6e5f4a3b2c1d0e9f8a7b6c5d\trefs/tags/0.F
1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b\trefs/tags/0.F^{}
0f9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b3a2f1e\trefs/tags/0.G
aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa\trefs/tags/cdda-experimental-2024-01-01-0000
";

    #[test]
    fn test_parse_ls_remote() {
        assert_eq!(parse_ls_remote(OUTPUT), vec!["0.F", "0.G", "cdda-experimental-2024-01-01-0000"]);
    }

    #[rstest]
    #[case("")]
    #[case("\n\n")]
    #[case("8f3c2d1e\trefs/heads/master")]
    #[case("8f3c2d1e\trefs/tags/")]
    #[case("warning: redirecting to https://github.com/x/y.git/")]
    fn test_parse_ls_remote_ignores_noise(#[case] stdout: &str) {
        assert!(parse_ls_remote(stdout).is_empty());
    }

    #[test]
    fn test_parse_ls_remote_dedupes() {
        let stdout = "a\trefs/tags/v1\nb\trefs/tags/v2\nc\trefs/tags/v1\r\n";
        assert_eq!(parse_ls_remote(stdout), vec!["v1", "v2"]);
    }

    #[test]
    fn test_parse_ls_remote_keeps_nested_names() {
        assert_eq!(parse_ls_remote("abc\trefs/tags/release/2024"), vec!["release/2024"]);
    }

    #[test]
    fn test_remote_url() {
        let git = GitLsRemote::with_executable("git", "https://github.com/", Duration::from_secs(1));
        assert_eq!(git.remote_url("CleverRaven/Cataclysm-DDA"), "https://github.com/CleverRaven/Cataclysm-DDA.git");
    }

    #[tokio::test]
    async fn test_missing_executable_is_discovery_error() {
        let git = GitLsRemote::with_executable("/nonexistent/reldb-git", "https://github.com", Duration::from_secs(5));
        let err = git.list_tags("a/b").await.unwrap_err();
        assert_eq!(&*err, &ErrorKind::Discovery("a/b".to_string()));
    }
}
