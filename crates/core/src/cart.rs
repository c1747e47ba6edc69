//! Shopping cart lines and membership lookup.

use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// One product in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Whether a product is in the cart, and how many.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartMembership {
    pub in_cart: bool,
    pub quantity: u32,
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look a product up by id. The first matching line wins.
    #[must_use]
    pub fn membership(&self, product_id: ProductId) -> CartMembership {
        self.lines
            .iter()
            .find(|line| line.product_id == product_id)
            .map_or_else(CartMembership::default, |line| CartMembership {
                in_cart: true,
                quantity: line.quantity,
            })
    }

    /// Add units of a product, merging into an existing line.
    ///
    /// A zero quantity is ignored.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0u32, |total, line| total.saturating_add(line.quantity))
    }
}

impl FromIterator<CartLine> for Cart {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_absent() {
        let cart = Cart::default();
        assert_eq!(
            cart.membership(ProductId::new(1)),
            CartMembership {
                in_cart: false,
                quantity: 0
            }
        );
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(3), 2);
        cart.add(ProductId::new(4), 1);
        cart.add(ProductId::new(3), 1);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(
            cart.membership(ProductId::new(3)),
            CartMembership {
                in_cart: true,
                quantity: 3
            }
        );
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_zero_quantity_is_ignored() {
        let mut cart = Cart::default();
        cart.add(ProductId::new(3), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_first_matching_line_wins() {
        let cart: Cart = [
            CartLine {
                product_id: ProductId::new(8),
                quantity: 2,
            },
            CartLine {
                product_id: ProductId::new(8),
                quantity: 5,
            },
        ]
        .into_iter()
        .collect();
        assert_eq!(cart.membership(ProductId::new(8)).quantity, 2);
    }
}
