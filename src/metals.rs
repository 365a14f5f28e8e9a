//! Metals

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grams in one troy ounce.
pub const TROY_OUNCE_GRAMS: Decimal = Decimal::from_parts(311_035, 0, 0, false, 4);

/// A precious metal that inventory can be priced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    /// Gold
    Gold,

    /// Silver
    Silver,

    /// Platinum
    Platinum,

    /// Palladium
    Palladium,
}

impl Metal {
    /// Every metal, in display order.
    pub const ALL: [Metal; 4] = [Metal::Gold, Metal::Silver, Metal::Platinum, Metal::Palladium];

    /// Lowercase name used as the rate table key and storage value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Platinum => "platinum",
            Self::Palladium => "palladium",
        }
    }

    /// Whether the live spot feed quotes this metal.
    #[must_use]
    pub const fn is_live_quoted(self) -> bool {
        matches!(self, Self::Gold | Self::Silver)
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a metal name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metal \"{0}\"")]
pub struct UnknownMetal(pub String);

impl FromStr for Metal {
    type Err = UnknownMetal;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|metal| metal.as_str() == normalised)
            .ok_or_else(|| UnknownMetal(value.to_string()))
    }
}

/// Converts a per-troy-ounce price to a per-gram price.
#[must_use]
pub fn per_ounce_to_per_gram(per_ounce: Decimal) -> Decimal {
    per_ounce / TROY_OUNCE_GRAMS
}
