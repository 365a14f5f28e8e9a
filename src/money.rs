//! Money
//!
//! Amounts are carried as [`Decimal`] in the deployment currency. Gateways want
//! integer minor units, which is the only place a currency is attached.

use rust_decimal::Decimal;
use rusty_money::{Money, iso};
use thiserror::Error;

use crate::pricing::round_money;

/// Errors raised converting amounts for a currency.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Currency code is not an ISO 4217 code.
    #[error("unknown currency code \"{0}\"")]
    UnknownCurrency(String),
}

/// Looks up an ISO currency by code.
///
/// # Errors
///
/// [`CurrencyError::UnknownCurrency`] when the code is not recognised.
pub fn currency(code: &str) -> Result<&'static iso::Currency, CurrencyError> {
    iso::find(&code.trim().to_ascii_uppercase())
        .ok_or_else(|| CurrencyError::UnknownCurrency(code.to_string()))
}

/// Converts an amount to integer minor units (paise, cents) after rounding to
/// two places.
#[must_use]
pub fn to_minor_units(amount: Decimal, currency: &'static iso::Currency) -> i64 {
    Money::from_decimal(round_money(amount), currency).to_minor_units()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_minor_units() -> TestResult {
        let inr = currency("inr")?;

        assert_eq!(to_minor_units(dec!(10935.68), inr), 1_093_568);
        assert_eq!(to_minor_units(dec!(1), inr), 100);

        Ok(())
    }

    #[test]
    fn test_unknown_currency() {
        assert!(
            matches!(currency("XYZ"), Err(CurrencyError::UnknownCurrency(code)) if code == "XYZ"),
            "unknown codes should be rejected"
        );
    }
}
