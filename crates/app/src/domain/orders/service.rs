//! Orders service.
//!
//! [`OrderStockController`] prices and reserves orders. The availability check
//! at creation is advisory; the conditional decrement at commit time is what
//! prevents overselling.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use aurum::{attributes::MAX_AMOUNT, pricing::round_money, valuation::price_for};
use mockall::automock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tracing::{info, warn};

use crate::{
    access::{Actor, Capability},
    domain::{
        inventory::{models::ProductUuid, repository::InventoryRepository},
        orders::{
            errors::OrdersServiceError,
            models::{
                NewOrder, Order, OrderDraft, OrderLine, OrderStatus, OrderUuid, PaymentMethod,
                PaymentStatus, StockCommit, StockShortage,
            },
            repository::OrdersRepository,
        },
        rates::RatesService,
    },
};

#[derive(Clone)]
pub struct OrderStockController {
    orders: Arc<dyn OrdersRepository>,
    inventory: Arc<dyn InventoryRepository>,
    rates: Arc<dyn RatesService>,
}

impl std::fmt::Debug for OrderStockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderStockController").finish_non_exhaustive()
    }
}

impl OrderStockController {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersRepository>,
        inventory: Arc<dyn InventoryRepository>,
        rates: Arc<dyn RatesService>,
    ) -> Self {
        Self {
            orders,
            inventory,
            rates,
        }
    }

    /// Loads an order the actor may see. Orders belonging to someone else
    /// read as missing unless the actor manages orders.
    async fn visible_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let order = self.orders.get_order(order).await?;

        if order.user != actor.user && !actor.role.allows(Capability::ManageOrders) {
            return Err(OrdersServiceError::NotFound);
        }

        Ok(order)
    }

    /// Prices merged lines at the current rates after checking stock.
    async fn price_lines(
        &self,
        requested: &BTreeMap<ProductUuid, u64>,
    ) -> Result<Vec<OrderLine>, OrdersServiceError> {
        let items: FxHashMap<_, _> = self
            .inventory
            .get_items(requested.keys().copied().collect())
            .await?
            .into_iter()
            .map(|item| (item.uuid, item))
            .collect();

        let mut shortages = Vec::new();

        for (&product, &quantity) in requested {
            let item = items
                .get(&product)
                .ok_or(OrdersServiceError::UnknownProduct(product))?;

            if quantity > item.stock {
                shortages.push(StockShortage {
                    product,
                    requested: quantity,
                    available: item.stock,
                });
            }
        }

        if !shortages.is_empty() {
            return Err(OrdersServiceError::InsufficientStock(shortages));
        }

        let rates = self.rates.current_rates().await;

        requested
            .iter()
            .map(|(&product, &quantity)| {
                let item = items
                    .get(&product)
                    .ok_or(OrdersServiceError::UnknownProduct(product))?;

                let valuation = price_for(&item.attributes, &rates)
                    .map_err(|_overflow| OrdersServiceError::Unpriceable(product))?;

                Ok(OrderLine {
                    product,
                    quantity,
                    unit_price: valuation.total(),
                })
            })
            .collect()
    }
}

/// Merges duplicate product lines, rejecting zero quantities.
fn merge_lines(order: &NewOrder) -> Result<BTreeMap<ProductUuid, u64>, OrdersServiceError> {
    if order.lines.is_empty() {
        return Err(OrdersServiceError::EmptyOrder);
    }

    let mut merged = BTreeMap::new();

    for line in &order.lines {
        if line.quantity == 0 {
            return Err(OrdersServiceError::InvalidQuantity(line.product));
        }

        let quantity: &mut u64 = merged.entry(line.product).or_default();

        *quantity = quantity
            .checked_add(line.quantity)
            .ok_or(OrdersServiceError::InvalidQuantity(line.product))?;
    }

    Ok(merged)
}

/// Sum of line totals, refusing amounts larger than an order can store.
fn order_total(lines: &[OrderLine]) -> Result<Decimal, OrdersServiceError> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        line.unit_price
            .checked_mul(Decimal::from(line.quantity))
            .and_then(|line_total| total.checked_add(line_total))
            .filter(|total| line.unit_price <= MAX_AMOUNT && *total <= MAX_AMOUNT)
            .ok_or(OrdersServiceError::TotalTooLarge)
    })
}

#[async_trait]
impl OrdersService for OrderStockController {
    async fn place_order(&self, actor: Actor, order: NewOrder) -> Result<Order, OrdersServiceError> {
        let requested = merge_lines(&order)?;

        let address = order.address.trim();

        if address.is_empty() {
            return Err(OrdersServiceError::MissingAddress);
        }

        let lines = self.price_lines(&requested).await?;
        let total = order_total(&lines)?;

        if let Some(quoted) = order.quoted_total
            && round_money(quoted) != total
        {
            info!(%quoted, current = %total, "rejecting order quoted at stale prices");

            return Err(OrdersServiceError::PriceChanged {
                quoted,
                current: total,
            });
        }

        let (status, payment_status) = match order.payment_method {
            PaymentMethod::Cod => (OrderStatus::Confirmed, PaymentStatus::Cod),
            PaymentMethod::Online => (OrderStatus::Pending, PaymentStatus::Pending),
        };

        let draft = OrderDraft {
            uuid: OrderUuid::new(),
            user: actor.user,
            lines,
            total,
            address: address.to_string(),
            payment_method: order.payment_method,
            status,
            payment_status,
        };

        let placed = match order.payment_method {
            PaymentMethod::Cod => match self.orders.insert_committed_order(draft).await? {
                StockCommit::Committed(placed) => placed,
                StockCommit::Short(shortages) => {
                    warn!(
                        user = %actor.user,
                        lines = shortages.len(),
                        "stock ran out between check and commit"
                    );

                    return Err(OrdersServiceError::InsufficientStock(shortages));
                }
            },
            PaymentMethod::Online => self.orders.insert_order(draft).await?,
        };

        info!(
            order = %placed.uuid,
            user = %placed.user,
            total = %placed.total,
            method = %placed.payment_method,
            status = %placed.status,
            "order placed"
        );

        Ok(placed)
    }

    async fn get_order(&self, actor: Actor, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        self.visible_order(actor, order).await
    }

    async fn cancel_order(&self, actor: Actor, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let existing = self.orders.get_order(order).await?;

        if existing.user != actor.user {
            return Err(OrdersServiceError::NotFound);
        }

        if existing.status != OrderStatus::Pending || !existing.payment_status.is_unsettled() {
            return Err(OrdersServiceError::NotCancellable);
        }

        let deleted = self.orders.delete_unpaid_order(order, actor.user).await?;

        // Payment captured between the read and the delete.
        if deleted == 0 {
            return Err(OrdersServiceError::NotCancellable);
        }

        info!(%order, user = %actor.user, "order cancelled");

        Ok(())
    }

    async fn advance_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        actor.require(Capability::ManageOrders)?;

        let existing = self.orders.get_order(order).await?;

        if !existing.status.can_advance_to(next) {
            return Err(OrdersServiceError::InvalidTransition {
                from: existing.status,
                to: next,
            });
        }

        let updated = self.orders.update_status(order, existing.status, next).await?;

        if updated == 0 {
            let current = self.orders.get_order(order).await?;

            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: next,
            });
        }

        info!(%order, from = %existing.status, to = %next, "order status advanced");

        Ok(self.orders.get_order(order).await?)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Validates, prices and stores an order. Cash-on-delivery orders commit
    /// stock immediately; online orders wait for payment.
    async fn place_order(&self, actor: Actor, order: NewOrder) -> Result<Order, OrdersServiceError>;

    /// Reads an order owned by the actor.
    async fn get_order(&self, actor: Actor, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Deletes the actor's own pending, unsettled order.
    async fn cancel_order(&self, actor: Actor, order: OrderUuid) -> Result<(), OrdersServiceError>;

    /// Moves an order along fulfilment.
    async fn advance_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;
}
