mod client;
mod models;
mod rate_limit;

pub use self::client::{ClientOptions, GitHubClient};
pub use self::rate_limit::RateLimit;
