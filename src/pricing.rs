//! Pricing
//!
//! The valuation formula. Every term is carried at full precision and the total
//! is rounded once, half-up to two places, so the same rate and attributes give
//! the same total no matter where it is computed.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::attributes::{
    AMOUNT_SCALE, AttributeError, MAX_AMOUNT, MAX_WASTAGE_PERCENT, MAX_WEIGHT, WEIGHT_SCALE,
    validate_purity, within,
};

/// Decimal places kept on money amounts.
pub const MONEY_SCALE: u32 = 2;

const HUNDRED: Decimal = dec!(100);

/// Attributes the price formula reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInputs {
    /// Purity, in percent.
    pub purity: Decimal,

    /// Net metal weight, in grams.
    pub net_weight: Decimal,

    /// Wastage surcharge, in percent of metal value.
    pub wastage_percent: Decimal,

    /// Labour charge per gram.
    pub making_charge_per_gram: Decimal,

    /// Value of stones and other additions.
    pub extra_value: Decimal,
}

impl PriceInputs {
    /// Checks that inputs are usable by the formula.
    ///
    /// # Errors
    ///
    /// Returns an [`AttributeError`] for invalid purity, or for amounts that
    /// are negative or could not be stored on an item.
    pub fn validate(&self, hallmarked: bool) -> Result<(), AttributeError> {
        validate_purity(self.purity, hallmarked)?;
        within("netWeight", self.net_weight, WEIGHT_SCALE, MAX_WEIGHT)?;
        within(
            "wastagePercent",
            self.wastage_percent,
            AMOUNT_SCALE,
            MAX_WASTAGE_PERCENT,
        )?;
        within(
            "makingChargePerGram",
            self.making_charge_per_gram,
            AMOUNT_SCALE,
            MAX_AMOUNT,
        )?;
        within("extraValue", self.extra_value, AMOUNT_SCALE, MAX_AMOUNT)?;

        Ok(())
    }
}

/// Money breakdown of an item price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Value of the pure metal content.
    pub metal_value: Decimal,

    /// Wastage surcharge.
    pub wastage_amount: Decimal,

    /// Labour charge.
    pub making_charge: Decimal,

    /// Stones and other additions.
    pub extra_value: Decimal,

    /// Rounded total.
    pub total_price: Decimal,
}

impl PriceBreakdown {
    /// Breakdown with every component rounded for display. The total is left as
    /// computed from the unrounded terms.
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            metal_value: round_money(self.metal_value),
            wastage_amount: round_money(self.wastage_amount),
            making_charge: round_money(self.making_charge),
            extra_value: round_money(self.extra_value),
            total_price: self.total_price,
        }
    }

    /// Sum of the unrounded components.
    #[must_use]
    pub fn unrounded_total(&self) -> Decimal {
        self.metal_value + self.wastage_amount + self.making_charge + self.extra_value
    }
}

/// Computes the price of an item at a per-gram `rate`.
///
/// # Errors
///
/// [`AttributeError::Overflow`] when a term leaves the `Decimal` range.
pub fn compute_price(
    rate: Decimal,
    inputs: &PriceInputs,
) -> Result<PriceBreakdown, AttributeError> {
    let metal_value = (inputs.purity / HUNDRED)
        .checked_mul(inputs.net_weight)
        .and_then(|value| value.checked_mul(rate))
        .ok_or(AttributeError::Overflow)?;
    let wastage_amount = metal_value
        .checked_mul(inputs.wastage_percent / HUNDRED)
        .ok_or(AttributeError::Overflow)?;
    let making_charge = inputs
        .net_weight
        .checked_mul(inputs.making_charge_per_gram)
        .ok_or(AttributeError::Overflow)?;

    let total = metal_value
        .checked_add(wastage_amount)
        .and_then(|sum| sum.checked_add(making_charge))
        .and_then(|sum| sum.checked_add(inputs.extra_value))
        .ok_or(AttributeError::Overflow)?;

    Ok(PriceBreakdown {
        metal_value,
        wastage_amount,
        making_charge,
        extra_value: inputs.extra_value,
        total_price: round_money(total),
    })
}

/// Rounds half-up to [`MONEY_SCALE`] places.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
