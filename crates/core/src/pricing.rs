//! Discounts and displayed prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// Error returned for a discount outside `0..=100`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("discount must be between 0 and 100 percent (got {0})")]
pub struct DiscountError(pub i64);

/// A whole-number percentage discount in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    pub const NONE: Self = Self(0);

    /// # Errors
    ///
    /// Returns [`DiscountError`] if `percent` is negative or above 100.
    pub fn new(percent: i64) -> Result<Self, DiscountError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Self)
            .ok_or(DiscountError(percent))
    }

    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_discounted(&self) -> bool {
        self.0 > 0
    }

    /// Apply the discount to a base price.
    ///
    /// A zero discount returns `base` unchanged, so the shown price is the base
    /// price to the last digit. The result never exceeds `base`.
    #[must_use]
    pub fn apply(&self, base: Price) -> Price {
        if !self.is_discounted() {
            return base;
        }
        let remaining = Decimal::from(100 - self.0);
        base.with_amount(base.amount() * remaining / Decimal::ONE_HUNDRED)
    }
}

impl TryFrom<i64> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(discount: DiscountPercent) -> Self {
        discount.0
    }
}

/// What a price label shows for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDisplay {
    /// The price the shopper pays.
    pub current: Price,
    /// The struck-through base price, present only when discounted.
    pub original: Option<Price>,
    /// The `-N%` badge value, present only when discounted.
    pub discount_badge: Option<u8>,
}

impl PriceDisplay {
    #[must_use]
    pub fn resolve(base: Price, discount: DiscountPercent) -> Self {
        if discount.is_discounted() {
            Self {
                current: discount.apply(base),
                original: Some(base),
                discount_badge: Some(discount.value()),
            }
        } else {
            Self {
                current: base,
                original: None,
                discount_badge: None,
            }
        }
    }
}
