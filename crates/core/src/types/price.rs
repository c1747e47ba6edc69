//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are kept as [`Decimal`] end to end so that discounting never picks
//! up binary floating point error; rounding happens only when formatting.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimals shown on price labels.
const DISPLAY_DECIMALS: u32 = 2;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPrice")]
pub struct Price {
    /// Amount in the currency's standard unit (dinars, not millimes).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PricingError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PricingError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// Create a price in Tunisian dinars.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Negative`] if `amount` is below zero.
    pub fn tnd(amount: Decimal) -> Result<Self, PricingError> {
        Self::new(amount, CurrencyCode::TND)
    }

    /// The exact (unrounded) amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// Replace the amount, keeping the currency.
    ///
    /// Callers must only pass amounts derived from this price (discounting,
    /// multiplying by a quantity), which cannot turn negative.
    #[must_use]
    pub(crate) const fn with_amount(self, amount: Decimal) -> Self {
        Self {
            amount,
            currency_code: self.currency_code,
        }
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self.with_amount(self.amount * Decimal::from(quantity))
    }

    /// The amount rounded half away from zero to two decimals.
    #[must_use]
    pub fn rounded_amount(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Unchecked wire form of [`Price`], validated on deserialization.
#[derive(Deserialize)]
struct RawPrice {
    amount: Decimal,
    currency_code: CurrencyCode,
}

impl TryFrom<RawPrice> for Price {
    type Error = PricingError;

    fn try_from(raw: RawPrice) -> Result<Self, Self::Error> {
        Self::new(raw.amount, raw.currency_code)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} {}",
            self.rounded_amount(),
            self.currency_code.code()
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    TND,
    EUR,
    USD,
}

impl CurrencyCode {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::TND => "TND",
            Self::EUR => "EUR",
            Self::USD => "USD",
        }
    }
}
