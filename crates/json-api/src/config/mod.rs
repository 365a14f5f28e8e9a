//! Server configuration module

use clap::Parser;
use thiserror::Error;

use aurum_app::context::AppConfig;

use crate::config::{
    db::DatabaseConfig,
    observability::ObservabilityConfig,
    payments::PaymentsConfig,
    rates::RatesConfig,
    server::ServerRuntimeConfig,
    validation::ValidationConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod payments;
pub(crate) mod rates;
pub(crate) mod server;
pub(crate) mod validation;

/// Errors raised turning parsed settings into application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Calibration multipliers must be positive.
    #[error("calibration multiplier for {metal} must be greater than zero")]
    Calibration {
        /// Metal the multiplier applies to.
        metal: &'static str,
    },

    /// Some but not all gateway settings were supplied.
    #[error("payment gateway settings are incomplete: missing {0}")]
    IncompleteGateway(&'static str),
}

/// Aurum JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "aurum-json", about = "Aurum JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging and request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Spot feed and rate cache settings.
    #[command(flatten)]
    pub rates: RatesConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub payments: PaymentsConfig,

    /// Inventory validation settings.
    #[command(flatten)]
    pub validation: ValidationConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for assembling the application services.
    ///
    /// # Errors
    ///
    /// Returns an error when rate or gateway settings are inconsistent.
    pub fn app_config(&self) -> Result<AppConfig, ConfigError> {
        Ok(AppConfig {
            database_url: self.database.database_url.clone(),
            migrate: self.database.run_migrations,
            feed_url: self.rates.feed_url.clone(),
            feed_timeout: self.rates.feed_timeout(),
            rate_cache: self.rates.cache_config()?,
            weight_policy: self.validation.weight_policy.into(),
            payments: self.payments.gateway_config()?,
        })
    }
}
