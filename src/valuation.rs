//! Valuation
//!
//! Binds the price formula to an item: picks which per-gram rate applies and
//! returns the breakdown together with where that rate came from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    attributes::{AttributeError, ItemAttributes},
    pricing::{PriceBreakdown, compute_price},
    rates::{RateOrigin, RateTable},
};

/// Which rate priced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppliedRate {
    /// Rate table entry for the item's metal.
    Table(RateOrigin),

    /// The per-gram price saved on the item itself.
    ItemStored,

    /// No rate was available; only labour and extras are priced.
    Unpriced,
}

/// An item's price at a given rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    /// Per-gram rate used.
    pub rate: Decimal,

    /// Where the rate came from.
    pub applied: AppliedRate,

    /// Price breakdown.
    pub breakdown: PriceBreakdown,
}

impl Valuation {
    /// Rounded total price.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.breakdown.total_price
    }
}

/// Selects the per-gram rate for an item.
///
/// The table entry for the item's metal wins, then the price stored on the
/// item, then zero.
#[must_use]
pub fn resolve_rate(item: &ItemAttributes, rates: &RateTable) -> (Decimal, AppliedRate) {
    if let Some(entry) = rates.get(item.metal) {
        return (entry.price_per_gram, AppliedRate::Table(entry.origin));
    }

    match item.stored_metal_price {
        Some(price) => (price, AppliedRate::ItemStored),
        None => (Decimal::ZERO, AppliedRate::Unpriced),
    }
}

/// Prices an item against a rate table.
///
/// # Errors
///
/// [`AttributeError::Overflow`] when the price cannot be represented.
pub fn price_for(item: &ItemAttributes, rates: &RateTable) -> Result<Valuation, AttributeError> {
    let (rate, applied) = resolve_rate(item, rates);

    Ok(Valuation {
        rate,
        applied,
        breakdown: compute_price(rate, &item.price_inputs())?,
    })
}
