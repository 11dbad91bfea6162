use reqwest::header::HeaderMap;
use std::time::Duration;

const LIMIT: &str = "x-ratelimit-limit";
const REMAINING: &str = "x-ratelimit-remaining";
const RESET: &str = "x-ratelimit-reset";
const RETRY_AFTER: &str = "retry-after";

/// Rate-limit budget as reported by the most recent API response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix timestamp (seconds) at which `remaining` refills.
    pub reset: Option<i64>,
    /// Seconds to back off, sent with secondary rate limits.
    pub retry_after: Option<u64>,
    /// Whether the budget is the (much larger) authenticated quota.
    pub authenticated: bool,
}
impl RateLimit {
    pub fn from_headers(headers: &HeaderMap, authenticated: bool) -> Self {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        }
        Self {
            limit: header(headers, LIMIT),
            remaining: header(headers, REMAINING),
            reset: header(headers, RESET),
            retry_after: header(headers, RETRY_AFTER),
            authenticated,
        }
    }

    pub fn is_known(&self) -> bool {
        self.remaining.is_some() || self.retry_after.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// How long to pause before the next request, if at all.
    ///
    /// A `retry-after` always wins. Otherwise the pause lasts until one second
    /// past `reset` once fewer than `floor` requests remain. Never longer than
    /// `max`.
    pub fn wait(&self, floor: u32, now: i64, max: Duration) -> Option<Duration> {
        if let Some(after) = self.retry_after {
            return Some(Duration::from_secs(after).min(max));
        }
        if self.remaining? >= floor {
            return None;
        }
        // A garbage reset header must not overflow.
        let seconds = self.reset?.checked_add(1)?.saturating_sub(now);
        if seconds <= 0 {
            return None;
        }
        Some(Duration::from_secs(seconds.unsigned_abs()).min(max))
    }
}
