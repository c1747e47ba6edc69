//! Stock level classification.

use serde::{Deserialize, Serialize};

/// Quantities strictly below this (and above zero) count as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// How much of a product is left, as far as the shopper is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    /// Nothing left; the product cannot be added to the cart.
    OutOfStock,
    /// Between 1 and 9 units left.
    Low(u32),
    /// Ten units or more.
    Available(u32),
}

impl StockLevel {
    #[must_use]
    pub const fn from_quantity(quantity: u32) -> Self {
        match quantity {
            0 => Self::OutOfStock,
            q if q < LOW_STOCK_THRESHOLD => Self::Low(q),
            q => Self::Available(q),
        }
    }

    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        matches!(self, Self::OutOfStock)
    }

    /// Whether the low-stock indicator should be shown.
    #[must_use]
    pub const fn is_low(&self) -> bool {
        matches!(self, Self::Low(_))
    }

    #[must_use]
    pub const fn remaining(&self) -> u32 {
        match self {
            Self::OutOfStock => 0,
            Self::Low(q) | Self::Available(q) => *q,
        }
    }
}
