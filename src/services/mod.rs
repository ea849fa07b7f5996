pub mod rate_limiter;
pub mod status_fetcher;
pub mod tracker;

pub use rate_limiter::RateLimiter;
pub use status_fetcher::{ObservedStatus, StatusFetcher};
pub use tracker::{Tracker, TrackerState};
