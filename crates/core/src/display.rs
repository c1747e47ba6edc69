//! Product card display derivation.
//!
//! Everything a product card shows that is not copied verbatim from the
//! product: the price label, the stock indicators, the in-cart badge and the
//! add-to-cart button. Pure function of the product and the current cart.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartMembership};
use crate::pricing::{DiscountPercent, PriceDisplay};
use crate::stock::StockLevel;
use crate::types::{Price, ProductId};

/// The pricing-relevant slice of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingView {
    pub base_price: Price,
    pub discount: DiscountPercent,
    pub stock_quantity: u32,
}

/// State of the add-to-cart button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddToCartButton {
    /// Stock is exhausted; the button is disabled.
    OutOfStock,
    /// Already in the cart; adds one more.
    AddMore,
    Add,
}

impl AddToCartButton {
    #[must_use]
    pub const fn resolve(stock: StockLevel, membership: CartMembership) -> Self {
        if stock.is_out_of_stock() {
            Self::OutOfStock
        } else if membership.in_cart {
            Self::AddMore
        } else {
            Self::Add
        }
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self, Self::OutOfStock)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OutOfStock => "Rupture de stock",
            Self::AddMore => "Ajouter plus",
            Self::Add => "Ajouter",
        }
    }
}

/// Everything derived for one product card render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductDisplay {
    pub price: PriceDisplay,
    pub stock: StockLevel,
    pub membership: CartMembership,
    pub button: AddToCartButton,
}

impl ProductDisplay {
    #[must_use]
    pub fn resolve(product_id: ProductId, pricing: &PricingView, cart: &Cart) -> Self {
        let stock = StockLevel::from_quantity(pricing.stock_quantity);
        let membership = cart.membership(product_id);
        Self {
            price: PriceDisplay::resolve(pricing.base_price, pricing.discount),
            stock,
            membership,
            button: AddToCartButton::resolve(stock, membership),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn pricing(discount: i64, stock_quantity: u32) -> PricingView {
        PricingView {
            base_price: Price::tnd(Decimal::new(100, 0)).unwrap(),
            discount: DiscountPercent::new(discount).unwrap(),
            stock_quantity,
        }
    }

    #[test]
    fn test_out_of_stock_wins_over_everything() {
        let id = ProductId::new(1);
        let mut in_cart = Cart::default();
        in_cart.add(id, 3);

        for cart in [Cart::default(), in_cart] {
            for discount in [0, 25, 100] {
                let display = ProductDisplay::resolve(id, &pricing(discount, 0), &cart);
                assert_eq!(display.button, AddToCartButton::OutOfStock);
                assert!(display.button.is_disabled());
                assert_eq!(display.button.label(), "Rupture de stock");
                assert!(!display.stock.is_low());
            }
        }
    }

    #[test]
    fn test_button_label_follows_cart() {
        let id = ProductId::new(5);
        let display = ProductDisplay::resolve(id, &pricing(0, 20), &Cart::default());
        assert_eq!(display.button.label(), "Ajouter");
        assert!(!display.membership.in_cart);

        let mut cart = Cart::default();
        cart.add(id, 2);
        let display = ProductDisplay::resolve(id, &pricing(0, 20), &cart);
        assert_eq!(display.button.label(), "Ajouter plus");
        assert_eq!(display.membership.quantity, 2);
    }

    #[test]
    fn test_low_stock_and_discount() {
        let display = ProductDisplay::resolve(ProductId::new(1), &pricing(25, 5), &Cart::default());
        assert!(display.stock.is_low());
        assert_eq!(display.price.current.to_string(), "75.00 TND");
        assert_eq!(display.price.discount_badge, Some(25));

        let display =
            ProductDisplay::resolve(ProductId::new(1), &pricing(0, 10), &Cart::default());
        assert!(!display.stock.is_low());
        assert_eq!(display.price.original, None);
    }
}
