//! Aurum prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    attributes::{AttributeError, ItemAttributes, ItemType, WeightMismatch, WeightPolicy},
    metals::{Metal, UnknownMetal},
    money::{CurrencyError, currency, to_minor_units},
    pricing::{PriceBreakdown, PriceInputs, compute_price, round_money},
    rates::{RateEntry, RateOrigin, RateTable},
    valuation::{AppliedRate, Valuation, price_for},
};
