use super::models::GitHubRelease;
use super::rate_limit::RateLimit;
use crate::error::{ErrorKind, Result};
use crate::source::ReleaseSource;
use async_trait::async_trait;
use exn::ResultExt;
use reldb_release::ReleaseMetadata;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause until the reset once fewer requests than this remain.
    pub rate_limit_floor: u32,
    pub max_rate_limit_wait: Duration,
}

/// Looks releases up through the GitHub REST API.
///
/// The rate-limit headers of every response are remembered, and the next
/// request waits for the budget to refill when it runs low.
#[derive(Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
    authenticated: bool,
    rate_limit_floor: u32,
    max_rate_limit_wait: Duration,
    rate: Mutex<RateLimit>,
}
impl GitHubClient {
    pub fn new(options: ClientOptions) -> Result<Self> {
        let api_url = match Url::parse(&options.api_url) {
            Ok(url) if !url.cannot_be_a_base() => url,
            _ => exn::bail!(ErrorKind::Config(format!("invalid API URL '{}'", options.api_url))),
        };
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        let token = options.token.as_deref().filter(|token| !token.is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {token}"))
                .or_raise(|| ErrorKind::Config("token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        } else {
            tracing::warn!("No GitHub token configured, unauthenticated requests are heavily rate limited");
        }
        let http = reqwest::Client::builder()
            .user_agent(options.user_agent)
            .default_headers(headers)
            .timeout(options.timeout)
            .build()
            .or_raise(|| ErrorKind::Config("could not build HTTP client".to_string()))?;
        let authenticated = token.is_some();
        Ok(Self {
            http,
            api_url,
            authenticated,
            rate_limit_floor: options.rate_limit_floor,
            max_rate_limit_wait: options.max_rate_limit_wait,
            rate: Mutex::new(RateLimit {
                authenticated,
                ..Default::default()
            }),
        })
    }

    /// Budget reported by the last response.
    pub async fn rate_limit(&self) -> RateLimit {
        *self.rate.lock().await
    }

    fn release_url(&self, repo: &str, tag: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("repos")
                .extend(repo.split('/'))
                .extend(["releases", "tags", tag]);
        }
        url
    }

    async fn respect_rate_limit(&self) {
        let rate = self.rate.lock().await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if let Some(wait) = rate.wait(self.rate_limit_floor, now, self.max_rate_limit_wait) {
            tracing::warn!(
                remaining = ?rate.remaining,
                reset = ?rate.reset,
                seconds = wait.as_secs(),
                "Rate limit nearly exhausted, waiting"
            );
            // Holding the lock keeps concurrent lookups behind the same pause.
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    #[tracing::instrument(skip(self))]
    async fn release_by_tag(&self, repo: &str, tag: &str) -> Result<Option<ReleaseMetadata>> {
        self.respect_rate_limit().await;
        let response = self
            .http
            .get(self.release_url(repo, tag))
            .send()
            .await
            .or_raise(|| ErrorKind::Network)?;
        let rate = RateLimit::from_headers(response.headers(), self.authenticated);
        if rate.is_known() {
            *self.rate.lock().await = rate;
        }
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("No release for tag");
            return Ok(None);
        }
        if let Some(kind) = status_error(status, &rate) {
            tracing::warn!(status = status.as_u16(), "Release lookup failed");
            exn::bail!(kind);
        }
        let release: GitHubRelease = response.json().await.or_raise(|| ErrorKind::InvalidResponse)?;
        Ok(Some(release.into_metadata()))
    }
}

/// Map a non-404 status to the error it stands for, if any.
fn status_error(status: StatusCode, rate: &RateLimit) -> Option<ErrorKind> {
    if status.is_success() {
        return None;
    }
    let limited = status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (rate.is_exhausted() || rate.retry_after.is_some()));
    Some(if limited {
        ErrorKind::RateLimited { reset: rate.reset }
    } else if status.is_server_error() {
        ErrorKind::Network
    } else {
        ErrorKind::Status(status.as_u16())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn client(api_url: &str) -> GitHubClient {
        GitHubClient::new(ClientOptions {
            api_url: api_url.to_string(),
            token: Some("secret".to_string()),
            user_agent: "reldb-test".to_string(),
            timeout: Duration::from_secs(5),
            rate_limit_floor: 10,
            max_rate_limit_wait: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[rstest]
    #[case("https://api.github.com", "0.G", "https://api.github.com/repos/CleverRaven/Cataclysm-DDA/releases/tags/0.G")]
    #[case("https://ghe.local/api/v3/", "0.G", "https://ghe.local/api/v3/repos/CleverRaven/Cataclysm-DDA/releases/tags/0.G")]
    #[case("https://api.github.com", "a/b", "https://api.github.com/repos/CleverRaven/Cataclysm-DDA/releases/tags/a%2Fb")]
    fn test_release_url(#[case] api_url: &str, #[case] tag: &str, #[case] expected: &str) {
        let url = client(api_url).release_url("CleverRaven/Cataclysm-DDA", tag);
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:someone@example.com")]
    fn test_invalid_api_url(#[case] api_url: &str) {
        let err = GitHubClient::new(ClientOptions {
            api_url: api_url.to_string(),
            token: None,
            user_agent: "reldb-test".to_string(),
            timeout: Duration::from_secs(5),
            rate_limit_floor: 10,
            max_rate_limit_wait: Duration::from_secs(60),
        })
        .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Config(_)));
    }

    #[rstest]
    #[case(StatusCode::OK, None, None)]
    #[case(StatusCode::TOO_MANY_REQUESTS, Some(5), Some(ErrorKind::RateLimited { reset: Some(1_000) }))]
    #[case(StatusCode::FORBIDDEN, Some(0), Some(ErrorKind::RateLimited { reset: Some(1_000) }))]
    #[case(StatusCode::FORBIDDEN, Some(5), Some(ErrorKind::Status(403)))]
    #[case(StatusCode::BAD_GATEWAY, Some(5), Some(ErrorKind::Network))]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, None, Some(ErrorKind::Network))]
    #[case(StatusCode::UNAUTHORIZED, None, Some(ErrorKind::Status(401)))]
    fn test_status_error(#[case] status: StatusCode, #[case] remaining: Option<u32>, #[case] expected: Option<ErrorKind>) {
        let rate = RateLimit {
            remaining,
            reset: Some(1_000),
            ..Default::default()
        };
        assert_eq!(status_error(status, &rate), expected);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::RateLimited { reset: None }.is_retryable());
        assert!(!ErrorKind::Status(401).is_retryable());
        assert!(!ErrorKind::InvalidResponse.is_retryable());
    }

    #[tokio::test]
    async fn test_fresh_client_has_no_budget_information() {
        let client = client("https://api.github.com");
        let rate = client.rate_limit().await;
        assert!(!rate.is_known());
        assert!(rate.authenticated);
    }
}
