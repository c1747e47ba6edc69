//! Login and logout bookkeeping on the session.
//!
//! Handlers read the identity through [`crate::services::ShopperSession`];
//! these helpers are the only writers.

use souk_core::ShopperAction;
use tower_sessions::Session;

use crate::models::{CurrentUser, session_keys};
use crate::services::ShopperSession;

/// Helper to set the current user in the session.
///
/// The session ID is cycled first so a pre-login session ID cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// The cart, wishlist and recently viewed list stay with the session. The
/// identity, any address draft and the user's delivery address are dropped.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<serde_json::Value>(session_keys::ADDRESS_DRAFT)
        .await?;
    ShopperSession::new(session.clone())
        .dispatch(ShopperAction::ClearDeliveryAddress)
        .await?;
    Ok(())
}
