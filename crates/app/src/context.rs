//! App Context

use std::{sync::Arc, time::Duration};

use aurum::{attributes::WeightPolicy, money::CurrencyError};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    database::{self, Db},
    domain::{
        inventory::{InventoryCatalog, InventoryService, PgInventoryRepository},
        orders::{OrderStockController, OrdersService, PgOrdersRepository},
        payments::{
            HttpPaymentGateway, PaymentGatewayConfig, PaymentVerifier, PaymentsService,
            PgPaymentsRepository,
        },
        rates::{
            CachedRatesService, HttpSpotFeed, PgRatesRepository, RateCache, RateCacheConfig,
            RatesService,
        },
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("invalid payment currency")]
    Currency(#[source] CurrencyError),
}

/// Everything needed to assemble the services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,

    /// Apply pending migrations on start.
    pub migrate: bool,

    pub feed_url: String,
    pub feed_timeout: Duration,
    pub rate_cache: RateCacheConfig,
    pub weight_policy: WeightPolicy,

    /// Online payments are disabled when absent.
    pub payments: Option<PaymentGatewayConfig>,
}

#[derive(Clone)]
pub struct AppContext {
    pub rates: Arc<dyn RatesService>,
    pub inventory: Arc<dyn InventoryService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the database is unreachable, a migration fails,
    /// or the payment currency is unknown.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let pool = database::connect(&config.database_url)
            .await
            .map_err(AppInitError::Database)?;

        if config.migrate {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        let db = Db::new(pool);

        let rates_repository = Arc::new(PgRatesRepository::new(db.clone()));
        let inventory_repository = Arc::new(PgInventoryRepository::new(db.clone()));
        let orders_repository = Arc::new(PgOrdersRepository::new(db.clone()));
        let payments_repository = Arc::new(PgPaymentsRepository::new(db));

        let feed = Arc::new(HttpSpotFeed::new(config.feed_url.clone(), config.feed_timeout));
        let cache = Arc::new(RateCache::new(feed, config.rate_cache));
        let rates: Arc<dyn RatesService> =
            Arc::new(CachedRatesService::new(cache, rates_repository));

        let payments = match &config.payments {
            Some(gateway) => {
                info!(currency = %gateway.currency, "online payments enabled");

                PaymentVerifier::new(
                    payments_repository,
                    orders_repository.clone(),
                    Arc::new(HttpPaymentGateway::new(gateway.clone())),
                    gateway,
                )
                .map_err(AppInitError::Currency)?
            }
            None => {
                warn!("payment gateway not configured; online payments disabled");

                PaymentVerifier::unconfigured(payments_repository, orders_repository.clone())
            }
        };

        Ok(Self {
            inventory: Arc::new(InventoryCatalog::new(
                inventory_repository.clone(),
                rates.clone(),
                config.weight_policy,
            )),
            orders: Arc::new(OrderStockController::new(
                orders_repository,
                inventory_repository,
                rates.clone(),
            )),
            payments: Arc::new(payments),
            rates,
        })
    }
}
