//! Data every full page needs for its header.

use souk_core::ShopperState;

use crate::models::CurrentUser;

/// Header and script context shared by all full-page templates.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// CSP nonce for the page's `<script>` tags.
    pub nonce: String,
    pub cart_count: u32,
    pub user_email: Option<String>,
}

impl Layout {
    #[must_use]
    pub fn new(nonce: String, shopper: &ShopperState, user: Option<&CurrentUser>) -> Self {
        Self {
            nonce,
            cart_count: shopper.cart.item_count(),
            user_email: user.map(|u| u.email.to_string()),
        }
    }
}
