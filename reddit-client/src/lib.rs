pub mod api;
pub mod fetcher;
pub mod rate_limiter;


pub use api::{permalink_url, RedditApiClient, UserListing};
pub use fetcher::{ContentFetcher, FetchOutcome};
pub use rate_limiter::{RateLimitConfig, RateLimiter};
