//! Rates service.

use std::sync::Arc;

use async_trait::async_trait;
use aurum::{attributes::validate_rate, metals::Metal, rates::RateTable};
use mockall::automock;
use rust_decimal::Decimal;
use tracing::info;

use crate::{
    access::{Actor, Capability},
    domain::rates::{
        cache::RateCache,
        errors::RatesServiceError,
        repository::{RatesRepository, StoredRate},
    },
};

#[derive(Clone)]
pub struct CachedRatesService {
    cache: Arc<RateCache>,
    repository: Arc<dyn RatesRepository>,
}

impl CachedRatesService {
    #[must_use]
    pub fn new(cache: Arc<RateCache>, repository: Arc<dyn RatesRepository>) -> Self {
        Self { cache, repository }
    }
}

impl std::fmt::Debug for CachedRatesService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRatesService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RatesService for CachedRatesService {
    async fn current_rates(&self) -> RateTable {
        self.cache.rates(self.repository.as_ref()).await
    }

    async fn set_stored_rate(
        &self,
        actor: Actor,
        metal: Metal,
        price_per_gram: Decimal,
    ) -> Result<StoredRate, RatesServiceError> {
        actor.require(Capability::ManageMetalRates)?;

        if validate_rate("pricePerGram", price_per_gram).is_err() {
            return Err(RatesServiceError::InvalidPrice(price_per_gram));
        }

        let stored = self
            .repository
            .upsert_stored_rate(metal, price_per_gram, actor.user)
            .await?;

        info!(%metal, %price_per_gram, updated_by = %actor.user, "stored rate updated");

        Ok(stored)
    }
}

#[automock]
#[async_trait]
pub trait RatesService: Send + Sync {
    /// The merged rate table used for every price shown or charged.
    async fn current_rates(&self) -> RateTable;

    /// Set the operator-maintained rate for a metal.
    async fn set_stored_rate(
        &self,
        actor: Actor,
        metal: Metal,
        price_per_gram: Decimal,
    ) -> Result<StoredRate, RatesServiceError>;
}
