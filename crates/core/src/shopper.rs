//! Per-visitor shopper state and the actions that mutate it.
//!
//! The storefront keeps one [`ShopperState`] per session. Handlers never poke
//! at its fields directly; they dispatch a [`ShopperAction`] and persist the
//! result, so every mutation is visible in one place.

use serde::{Deserialize, Serialize};

use crate::address::DeliveryAddress;
use crate::cart::Cart;
use crate::types::ProductId;

/// Maximum number of entries kept in the recently viewed list.
pub const RECENTLY_VIEWED_LIMIT: usize = 10;

/// Shared, per-visitor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopperState {
    #[serde(default)]
    pub cart: Cart,
    #[serde(default)]
    pub wishlist: Vec<ProductId>,
    /// Most recent first.
    #[serde(default)]
    pub recently_viewed: Vec<ProductId>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
}

/// A state update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopperAction {
    AddToCart {
        product_id: ProductId,
        quantity: u32,
    },
    SetDeliveryAddress(DeliveryAddress),
    /// Forget the delivery address, e.g. when the owner logs out.
    ClearDeliveryAddress,
    AddToRecentlyViewed(ProductId),
    ToggleWishlist(ProductId),
}

impl ShopperState {
    pub fn apply(&mut self, action: ShopperAction) {
        match action {
            ShopperAction::AddToCart {
                product_id,
                quantity,
            } => self.cart.add(product_id, quantity),
            ShopperAction::SetDeliveryAddress(address) => {
                self.delivery_address = Some(address);
            }
            ShopperAction::ClearDeliveryAddress => self.delivery_address = None,
            ShopperAction::AddToRecentlyViewed(product_id) => {
                self.recently_viewed.retain(|id| *id != product_id);
                self.recently_viewed.insert(0, product_id);
                self.recently_viewed.truncate(RECENTLY_VIEWED_LIMIT);
            }
            ShopperAction::ToggleWishlist(product_id) => {
                if self.is_wishlisted(product_id) {
                    self.wishlist.retain(|id| *id != product_id);
                } else {
                    self.wishlist.push(product_id);
                }
            }
        }
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: ProductId) -> bool {
        self.wishlist.contains(&product_id)
    }
}
