//! Catalog product.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use souk_core::{DiscountPercent, Price, PricingView, ProductId};

/// A grocery product as sold in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Price before any discount.
    pub base_price: Price,
    pub discount: DiscountPercent,
    pub stock_quantity: u32,
    /// Sales unit label, e.g. "kg" or "pièce".
    pub unit: String,
    pub supplier_name: Option<String>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub image_url: Option<String>,
    /// Average rating out of 5.
    pub rating: Option<Decimal>,
    pub review_count: u32,
}

impl Product {
    /// The slice of the product that drives price and stock display.
    #[must_use]
    pub const fn pricing(&self) -> PricingView {
        PricingView {
            base_price: self.base_price,
            discount: self.discount,
            stock_quantity: self.stock_quantity,
        }
    }

    /// Current unit price after discount.
    #[must_use]
    pub fn display_price(&self) -> Price {
        self.discount.apply(self.base_price)
    }
}
