//! Item Attributes
//!
//! The raw, seller-entered attributes of a piece of jewellery and the rules they
//! must satisfy before the item can be priced or stored.

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{metals::Metal, pricing::PriceInputs};

/// Highest purity value accepted.
pub const MAX_PURITY: Decimal = dec!(999.99);

/// Decimal places allowed on purity for items that are not hallmarked.
pub const UNHALLMARKED_PURITY_SCALE: u32 = 2;

/// Decimal places stored on purity for hallmarked items.
pub const HALLMARKED_PURITY_SCALE: u32 = 4;

/// Decimal places stored on weights, in grams.
pub const WEIGHT_SCALE: u32 = 3;

/// Largest weight the store holds, in grams.
pub const MAX_WEIGHT: Decimal = dec!(999999999.999);

/// Decimal places stored on money amounts entered per item.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest money amount the store holds per item.
pub const MAX_AMOUNT: Decimal = dec!(999999999999.99);

/// Largest wastage percentage the store holds.
pub const MAX_WASTAGE_PERCENT: Decimal = dec!(9999.99);

/// Decimal places stored on per-gram metal rates.
pub const RATE_SCALE: u32 = 4;

/// Largest per-gram metal rate the store holds.
pub const MAX_RATE: Decimal = dec!(9999999999.9999);

/// Wastage band enforced on [`ItemType::Normal`] items, in percent.
pub const NORMAL_WASTAGE_RANGE: (Decimal, Decimal) = (dec!(4), dec!(15));

/// Errors raised while validating item attributes or numeric input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    /// A required numeric field was absent.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A numeric field could not be parsed.
    #[error("{field} is not a valid number: \"{value}\"")]
    Malformed {
        /// Offending field.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// A field that must be zero or positive was negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// A field that must be strictly positive was zero or negative.
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    /// A field above the largest value that can be stored.
    #[error("{field} must not exceed {max}")]
    TooLarge {
        /// Offending field.
        field: &'static str,
        /// Largest accepted value.
        max: Decimal,
    },

    /// A field with more decimal places than are stored.
    #[error("{field} allows at most {max_scale} decimal places")]
    Precision {
        /// Offending field.
        field: &'static str,
        /// Decimal places kept.
        max_scale: u32,
    },

    /// The price formula left the representable range.
    #[error("price is too large to compute")]
    Overflow,

    /// Purity outside `0..=999.99`.
    #[error("purity {0} is outside 0 to 999.99")]
    PurityOutOfRange(Decimal),

    /// Purity with more decimal places than allowed: two without a hallmark,
    /// four with one.
    #[error("purity {0} has too many decimal places")]
    PurityPrecision(Decimal),

    /// Wastage outside the band allowed for the item type.
    #[error("wastage {value}% is outside {min}% to {max}% for normal items")]
    WastageOutOfRange {
        /// Wastage given.
        value: Decimal,
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },

    /// Gross weight does not equal net plus extra weight.
    #[error(transparent)]
    WeightMismatch(#[from] WeightMismatch),

    /// Item type not recognised.
    #[error("unknown item type \"{0}\"")]
    UnknownItemType(String),
}

/// Gross, net and extra weights that do not add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("gross weight {gross}g does not equal net {net}g plus extra {extra}g")]
pub struct WeightMismatch {
    /// Gross weight.
    pub gross: Decimal,
    /// Net weight.
    pub net: Decimal,
    /// Extra (stones, findings) weight.
    pub extra: Decimal,
}

/// How strictly `gross == net + extra` is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightPolicy {
    /// Mismatches are reported but accepted.
    #[default]
    Advisory,

    /// Mismatches are rejected.
    Enforce,
}

/// Workmanship class of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    /// Regular production piece; wastage is bounded.
    #[default]
    Normal,

    /// Antique piece.
    Antique,

    /// Bespoke, highly worked piece.
    HyperArtistic,
}

impl ItemType {
    /// Storage label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Antique => "Antique",
            Self::HyperArtistic => "HyperArtistic",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = AttributeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Normal" => Ok(Self::Normal),
            "Antique" => Ok(Self::Antique),
            "HyperArtistic" => Ok(Self::HyperArtistic),
            other => Err(AttributeError::UnknownItemType(other.to_string())),
        }
    }
}

/// Priceable attributes of an inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    /// Metal the item is made of.
    pub metal: Metal,

    /// Whether the item carries a hallmark.
    pub hallmarked: bool,

    /// Purity as a percentage of net weight (91.6 for 22 karat).
    pub purity: Decimal,

    /// Weight of the metal, in grams.
    pub net_weight: Decimal,

    /// Weight of stones and other additions, in grams.
    pub extra_weight: Decimal,

    /// Value of stones and other additions.
    pub extra_value: Decimal,

    /// Total weight, in grams.
    pub gross_weight: Decimal,

    /// Workmanship class.
    pub item_type: ItemType,

    /// Wastage surcharge, in percent of metal value.
    pub wastage_percent: Decimal,

    /// Labour charge per gram of net weight.
    pub making_charge_per_gram: Decimal,

    /// Per-gram metal price recorded on the item, used when no rate is known.
    pub stored_metal_price: Option<Decimal>,
}

impl ItemAttributes {
    /// Checks every attribute rule.
    ///
    /// # Errors
    ///
    /// Returns the first rule the attributes break. Weight consistency is only
    /// checked under [`WeightPolicy::Enforce`].
    pub fn validate(&self, policy: WeightPolicy) -> Result<(), AttributeError> {
        within("netWeight", self.net_weight, WEIGHT_SCALE, MAX_WEIGHT)?;
        within("extraWeight", self.extra_weight, WEIGHT_SCALE, MAX_WEIGHT)?;
        within("grossWeight", self.gross_weight, WEIGHT_SCALE, MAX_WEIGHT)?;
        within("extraValue", self.extra_value, AMOUNT_SCALE, MAX_AMOUNT)?;
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

        if let Some(price) = self.stored_metal_price {
            validate_rate("storedMetalPrice", price)?;
        }

        validate_purity(self.purity, self.hallmarked)?;

        if self.item_type == ItemType::Normal {
            let (min, max) = NORMAL_WASTAGE_RANGE;

            if self.wastage_percent < min || self.wastage_percent > max {
                return Err(AttributeError::WastageOutOfRange {
                    value: self.wastage_percent,
                    min,
                    max,
                });
            }
        }

        if policy == WeightPolicy::Enforce
            && let Some(mismatch) = self.weight_mismatch()
        {
            return Err(mismatch.into());
        }

        Ok(())
    }

    /// Reports gross/net/extra weights that do not add up.
    #[must_use]
    pub fn weight_mismatch(&self) -> Option<WeightMismatch> {
        (self.net_weight + self.extra_weight != self.gross_weight).then_some(WeightMismatch {
            gross: self.gross_weight,
            net: self.net_weight,
            extra: self.extra_weight,
        })
    }

    /// The subset of attributes the price formula reads.
    #[must_use]
    pub fn price_inputs(&self) -> PriceInputs {
        PriceInputs {
            purity: self.purity,
            net_weight: self.net_weight,
            wastage_percent: self.wastage_percent,
            making_charge_per_gram: self.making_charge_per_gram,
            extra_value: self.extra_value,
        }
    }
}

/// Checks purity range and precision. Items without a hallmark keep two
/// decimal places, hallmarked items four.
///
/// # Errors
///
/// [`AttributeError::PurityOutOfRange`] or [`AttributeError::PurityPrecision`].
pub fn validate_purity(purity: Decimal, hallmarked: bool) -> Result<(), AttributeError> {
    if purity < Decimal::ZERO || purity > MAX_PURITY {
        return Err(AttributeError::PurityOutOfRange(purity));
    }

    let max_scale = if hallmarked {
        HALLMARKED_PURITY_SCALE
    } else {
        UNHALLMARKED_PURITY_SCALE
    };

    if purity.normalize().scale() > max_scale {
        return Err(AttributeError::PurityPrecision(purity));
    }

    Ok(())
}

/// Checks a per-gram metal rate: positive, at most [`MAX_RATE`] and
/// [`RATE_SCALE`] places.
///
/// # Errors
///
/// [`AttributeError::NotPositive`], [`AttributeError::TooLarge`] or
/// [`AttributeError::Precision`].
pub fn validate_rate(field: &'static str, rate: Decimal) -> Result<Decimal, AttributeError> {
    if rate <= Decimal::ZERO {
        return Err(AttributeError::NotPositive(field));
    }

    within(field, rate, RATE_SCALE, MAX_RATE)
}

/// Checks that a value is non-negative and fits a column of `max_scale`
/// places holding at most `max`.
///
/// # Errors
///
/// [`AttributeError::Negative`], [`AttributeError::TooLarge`] or
/// [`AttributeError::Precision`].
pub fn within(
    field: &'static str,
    value: Decimal,
    max_scale: u32,
    max: Decimal,
) -> Result<Decimal, AttributeError> {
    non_negative(field, value)?;

    if value > max {
        return Err(AttributeError::TooLarge { field, max });
    }

    if value.normalize().scale() > max_scale {
        return Err(AttributeError::Precision { field, max_scale });
    }

    Ok(value)
}

/// Unwraps a required numeric field.
///
/// # Errors
///
/// [`AttributeError::Missing`] when the value is absent.
pub fn require(field: &'static str, value: Option<Decimal>) -> Result<Decimal, AttributeError> {
    value.ok_or(AttributeError::Missing(field))
}

/// Parses a numeric field from text.
///
/// # Errors
///
/// [`AttributeError::Missing`] for blank input, [`AttributeError::Malformed`]
/// when the text is not a decimal number.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, AttributeError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(AttributeError::Missing(field));
    }

    Decimal::from_str_exact(trimmed).map_err(|_ignored| AttributeError::Malformed {
        field,
        value: raw.to_string(),
    })
}

/// Rejects negative values.
///
/// # Errors
///
/// [`AttributeError::Negative`] when `value < 0`.
pub fn non_negative(field: &'static str, value: Decimal) -> Result<Decimal, AttributeError> {
    if value < Decimal::ZERO {
        return Err(AttributeError::Negative(field));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn ring() -> ItemAttributes {
        ItemAttributes {
            metal: Metal::Gold,
            hallmarked: false,
            purity: dec!(91.6),
            net_weight: dec!(10),
            extra_weight: dec!(0.5),
            extra_value: dec!(1200),
            gross_weight: dec!(10.5),
            item_type: ItemType::Normal,
            wastage_percent: dec!(8),
            making_charge_per_gram: dec!(500),
            stored_metal_price: Some(dec!(5900)),
        }
    }

    #[test]
    fn valid_item_passes_both_policies() -> TestResult {
        ring().validate(WeightPolicy::Advisory)?;
        ring().validate(WeightPolicy::Enforce)?;

        Ok(())
    }

    #[test]
    fn normal_item_wastage_is_bounded() {
        let mut item = ring();
        item.wastage_percent = dec!(3.5);

        assert!(matches!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::WastageOutOfRange { .. })
        ));

        item.wastage_percent = dec!(15.01);

        assert!(matches!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::WastageOutOfRange { .. })
        ));
    }

    #[test]
    fn wastage_bounds_are_inclusive() -> TestResult {
        let mut item = ring();

        item.wastage_percent = dec!(4);
        item.validate(WeightPolicy::Advisory)?;

        item.wastage_percent = dec!(15);
        item.validate(WeightPolicy::Advisory)?;

        Ok(())
    }

    #[test]
    fn antique_item_wastage_is_unbounded() -> TestResult {
        let mut item = ring();
        item.item_type = ItemType::Antique;
        item.wastage_percent = dec!(25);

        item.validate(WeightPolicy::Advisory)?;

        Ok(())
    }

    #[test]
    fn unhallmarked_purity_is_limited_to_two_places() -> TestResult {
        let mut item = ring();
        item.purity = dec!(91.666);

        assert_eq!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::PurityPrecision(dec!(91.666)))
        );

        item.hallmarked = true;
        item.validate(WeightPolicy::Advisory)?;

        Ok(())
    }

    #[test]
    fn hallmarked_purity_is_limited_to_stored_places() {
        assert_eq!(
            validate_purity(dec!(91.66667), true),
            Err(AttributeError::PurityPrecision(dec!(91.66667)))
        );
    }

    #[test]
    fn weights_are_limited_to_stored_places() {
        let mut item = ring();
        item.net_weight = dec!(10.0005);

        assert_eq!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::Precision {
                field: "netWeight",
                max_scale: WEIGHT_SCALE,
            })
        );
    }

    #[test]
    fn weights_above_storable_range_are_rejected() {
        let mut item = ring();
        item.net_weight = dec!(1e15);

        assert_eq!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::TooLarge {
                field: "netWeight",
                max: MAX_WEIGHT,
            })
        );
    }

    #[test]
    fn stored_metal_price_must_be_positive() {
        let mut item = ring();
        item.stored_metal_price = Some(Decimal::ZERO);

        assert_eq!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::NotPositive("storedMetalPrice"))
        );
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() -> TestResult {
        validate_purity(dec!(91.600), false)?;

        Ok(())
    }

    #[test]
    fn purity_range_is_checked() {
        assert_eq!(
            validate_purity(dec!(1000), true),
            Err(AttributeError::PurityOutOfRange(dec!(1000)))
        );
        assert_eq!(
            validate_purity(dec!(-1), true),
            Err(AttributeError::PurityOutOfRange(dec!(-1)))
        );
    }

    #[test]
    fn weight_mismatch_is_advisory_by_default() -> TestResult {
        let mut item = ring();
        item.gross_weight = dec!(11);

        item.validate(WeightPolicy::default())?;

        assert_eq!(
            item.weight_mismatch(),
            Some(WeightMismatch {
                gross: dec!(11),
                net: dec!(10),
                extra: dec!(0.5),
            })
        );

        Ok(())
    }

    #[test]
    fn weight_mismatch_is_rejected_when_enforced() {
        let mut item = ring();
        item.gross_weight = dec!(11);

        assert!(matches!(
            item.validate(WeightPolicy::Enforce),
            Err(AttributeError::WeightMismatch(_))
        ));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut item = ring();
        item.net_weight = dec!(-1);

        assert_eq!(
            item.validate(WeightPolicy::Advisory),
            Err(AttributeError::Negative("netWeight"))
        );
    }

    #[test]
    fn parse_decimal_rejects_garbage_instead_of_zeroing() {
        assert_eq!(
            parse_decimal("netWeight", "ten"),
            Err(AttributeError::Malformed {
                field: "netWeight",
                value: "ten".to_string(),
            })
        );
        assert_eq!(
            parse_decimal("netWeight", "  "),
            Err(AttributeError::Missing("netWeight"))
        );
    }

    #[test]
    fn parse_decimal_accepts_plain_numbers() -> TestResult {
        assert_eq!(parse_decimal("purity", " 91.6 ")?, dec!(91.6));

        Ok(())
    }

    #[test]
    fn item_type_round_trips_through_storage_label() -> TestResult {
        assert_eq!("HyperArtistic".parse::<ItemType>()?, ItemType::HyperArtistic);
        assert_eq!(ItemType::Antique.to_string(), "Antique");

        Ok(())
    }
}
