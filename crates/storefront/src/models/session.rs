//! Session-related types.
//!
//! Types stored in the session for authentication and shopper state.

use serde::{Deserialize, Serialize};

use souk_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the visitor's shopper state (cart, wishlist, recently viewed, address).
    pub const SHOPPER_STATE: &str = "shopper_state";

    /// Key for the in-progress delivery address form.
    pub const ADDRESS_DRAFT: &str = "address_draft";
}
