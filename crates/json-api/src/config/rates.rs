//! Rates Config

use std::time::Duration;

use aurum_app::domain::rates::{RateCacheConfig, feed::DEFAULT_FEED_URL};
use clap::Args;
use rust_decimal::Decimal;

use super::ConfigError;

/// Spot feed and rate cache settings.
#[derive(Debug, Args)]
pub struct RatesConfig {
    /// Spot feed endpoint returning per-ounce gold and silver prices
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Hard timeout for one feed call, in milliseconds
    #[arg(long, env = "FEED_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub feed_timeout_ms: u64,

    /// How long a live fetch is served, in seconds
    #[arg(long, env = "RATE_VALIDITY_SECONDS", default_value_t = 300_u64)]
    pub rate_validity_seconds: u64,

    /// Pause after a failed fetch before retrying the feed, in seconds
    #[arg(long, env = "RATE_FAILURE_BACKOFF_SECONDS", default_value_t = 30_u64)]
    pub rate_failure_backoff_seconds: u64,

    /// Multiplier applied to the per-gram gold price
    #[arg(long, env = "GOLD_CALIBRATION", default_value = "1")]
    pub gold_calibration: Decimal,

    /// Multiplier applied to the per-gram silver price
    #[arg(long, env = "SILVER_CALIBRATION", default_value = "1")]
    pub silver_calibration: Decimal,
}

impl RatesConfig {
    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_timeout_ms)
    }

    /// Cache settings.
    ///
    /// # Errors
    ///
    /// Returns an error when a calibration multiplier is not positive.
    pub fn cache_config(&self) -> Result<RateCacheConfig, ConfigError> {
        if self.gold_calibration <= Decimal::ZERO {
            return Err(ConfigError::Calibration { metal: "gold" });
        }

        if self.silver_calibration <= Decimal::ZERO {
            return Err(ConfigError::Calibration { metal: "silver" });
        }

        Ok(RateCacheConfig {
            validity: Duration::from_secs(self.rate_validity_seconds),
            failure_backoff: Duration::from_secs(self.rate_failure_backoff_seconds),
            gold_calibration: self.gold_calibration,
            silver_calibration: self.silver_calibration,
        })
    }
}
