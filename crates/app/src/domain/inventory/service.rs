//! Inventory service.
//!
//! Every price this service hands out goes through [`price_for`] against the
//! current merged rate table, so listing, detail and checkout agree.

use std::sync::Arc;

use async_trait::async_trait;
use aurum::{
    attributes::{AttributeError, ItemAttributes, WeightPolicy},
    pricing::{PriceBreakdown, PriceInputs, compute_price},
    rates::RateTable,
    valuation::price_for,
};
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::{
    access::{Actor, Capability},
    domain::{
        inventory::{
            errors::InventoryServiceError,
            models::{InventoryItem, InventoryItemUpdate, NewInventoryItem, PricedItem, ProductUuid},
            repository::InventoryRepository,
        },
        rates::RatesService,
    },
};

/// Inputs for an ad-hoc price quote at a caller-supplied rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteRequest {
    pub metal_price: Decimal,
    pub hallmarked: bool,
    pub inputs: PriceInputs,
}

#[derive(Clone)]
pub struct InventoryCatalog {
    repository: Arc<dyn InventoryRepository>,
    rates: Arc<dyn RatesService>,
    weight_policy: WeightPolicy,
}

impl std::fmt::Debug for InventoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryCatalog")
            .field("weight_policy", &self.weight_policy)
            .finish_non_exhaustive()
    }
}

impl InventoryCatalog {
    #[must_use]
    pub fn new(
        repository: Arc<dyn InventoryRepository>,
        rates: Arc<dyn RatesService>,
        weight_policy: WeightPolicy,
    ) -> Self {
        Self {
            repository,
            rates,
            weight_policy,
        }
    }

    fn check_attributes(
        &self,
        product: ProductUuid,
        attributes: &ItemAttributes,
    ) -> Result<(), InventoryServiceError> {
        attributes.validate(self.weight_policy)?;

        if self.weight_policy == WeightPolicy::Advisory
            && let Some(mismatch) = attributes.weight_mismatch()
        {
            warn!(%product, %mismatch, "inventory weights do not add up");
        }

        Ok(())
    }
}

fn priced(item: InventoryItem, rates: &RateTable) -> Result<PricedItem, InventoryServiceError> {
    let valuation = price_for(&item.attributes, rates)?;

    Ok(PricedItem { item, valuation })
}

#[async_trait]
impl InventoryService for InventoryCatalog {
    async fn quote(&self, request: QuoteRequest) -> Result<PriceBreakdown, InventoryServiceError> {
        request.inputs.validate(request.hallmarked)?;

        if request.metal_price < Decimal::ZERO {
            return Err(AttributeError::Negative("metalPrice").into());
        }

        Ok(compute_price(request.metal_price, &request.inputs)?.rounded())
    }

    async fn list_items(&self) -> Result<Vec<PricedItem>, InventoryServiceError> {
        let items = self.repository.list_items().await?;
        let rates = self.rates.current_rates().await;

        items.into_iter().map(|item| priced(item, &rates)).collect()
    }

    async fn get_item(&self, product: ProductUuid) -> Result<PricedItem, InventoryServiceError> {
        let item = self.repository.get_item(product).await?;
        let rates = self.rates.current_rates().await;

        priced(item, &rates)
    }

    async fn create_item(
        &self,
        actor: Actor,
        item: NewInventoryItem,
    ) -> Result<PricedItem, InventoryServiceError> {
        actor.require(Capability::ManageInventory)?;
        self.check_attributes(item.uuid, &item.attributes)?;

        let created = self.repository.create_item(item, actor.user).await?;

        info!(product = %created.uuid, stock = created.stock, "inventory item created");

        let rates = self.rates.current_rates().await;

        priced(created, &rates)
    }

    async fn update_item(
        &self,
        actor: Actor,
        product: ProductUuid,
        update: InventoryItemUpdate,
    ) -> Result<PricedItem, InventoryServiceError> {
        actor.require(Capability::ManageInventory)?;
        self.check_attributes(product, &update.attributes)?;

        let current = self.repository.get_item(product).await?;
        actor.require_owned(Capability::ManageInventory, current.created_by)?;

        let updated = self.repository.update_item(product, update).await?;

        info!(%product, stock = updated.stock, "inventory item updated");

        let rates = self.rates.current_rates().await;

        priced(updated, &rates)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Price arbitrary attributes at a given per-gram rate.
    async fn quote(&self, request: QuoteRequest) -> Result<PriceBreakdown, InventoryServiceError>;

    /// Every item, priced at the current rates.
    async fn list_items(&self) -> Result<Vec<PricedItem>, InventoryServiceError>;

    /// A single item, priced at the current rates.
    async fn get_item(&self, product: ProductUuid) -> Result<PricedItem, InventoryServiceError>;

    /// Creates an item after validating its attributes.
    async fn create_item(
        &self,
        actor: Actor,
        item: NewInventoryItem,
    ) -> Result<PricedItem, InventoryServiceError>;

    /// Replaces an item's editable fields after validating its attributes.
    /// Sellers may only edit items they created.
    async fn update_item(
        &self,
        actor: Actor,
        product: ProductUuid,
        update: InventoryItemUpdate,
    ) -> Result<PricedItem, InventoryServiceError>;
}
