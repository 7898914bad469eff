// Insight Application Layer

pub mod cache;
pub mod catalog;
pub mod commands;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod rate_limit;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheLayer, CacheTier};
pub use catalog::PatternCatalog;
pub use error::AppError;
pub use metrics::Metrics;
pub use ops::EventHub;
pub use rate_limit::{RateDecision, RateLimiter};
pub use state::AppState;
