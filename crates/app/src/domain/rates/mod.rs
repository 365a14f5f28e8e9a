//! Metal Rates

pub mod cache;
pub mod errors;
pub mod feed;
pub mod repository;
pub mod service;

pub use cache::{RateCache, RateCacheConfig};
pub use errors::{FeedError, RatesServiceError};
pub use feed::{HttpSpotFeed, SpotFeed, SpotQuote};
pub use repository::{PgRatesRepository, RatesRepository, StoredRate};
pub use service::*;
