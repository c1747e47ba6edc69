//! Per-visitor shopper state kept in the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use souk_core::{AddressFormState, ShopperAction, ShopperState};

use crate::models::{CurrentUser, session_keys};

/// Session-backed store for the visitor's shopper state.
///
/// All updates go through [`ShopperSession::dispatch`]. Concurrent requests
/// from the same visitor are last-writer-wins.
#[derive(Clone, Debug)]
pub struct ShopperSession {
    session: Session,
}

impl ShopperSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The underlying session, for login/logout bookkeeping.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
        self.session.get(session_keys::CURRENT_USER).await
    }

    /// Current shopper state; a fresh visitor gets the empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn state(&self) -> Result<ShopperState, tower_sessions::session::Error> {
        Ok(self
            .session
            .get::<ShopperState>(session_keys::SHOPPER_STATE)
            .await?
            .unwrap_or_default())
    }

    /// Apply an action and persist the result.
    ///
    /// Returns the updated state.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn dispatch(
        &self,
        action: ShopperAction,
    ) -> Result<ShopperState, tower_sessions::session::Error> {
        let mut state = self.state().await?;
        tracing::debug!(?action, "Dispatching shopper action");
        state.apply(action);
        self.session
            .insert(session_keys::SHOPPER_STATE, &state)
            .await?;
        Ok(state)
    }

    /// The in-progress address form, if the visitor has started editing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn address_draft(
        &self,
    ) -> Result<Option<AddressFormState>, tower_sessions::session::Error> {
        self.session.get(session_keys::ADDRESS_DRAFT).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_address_draft(
        &self,
        draft: &AddressFormState,
    ) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(session_keys::ADDRESS_DRAFT, draft).await
    }

    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn clear_address_draft(&self) -> Result<(), tower_sessions::session::Error> {
        self.session
            .remove::<AddressFormState>(session_keys::ADDRESS_DRAFT)
            .await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for ShopperSession
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use souk_core::ProductId;
    use tower_sessions::MemoryStore;

    use super::*;

    fn shopper() -> ShopperSession {
        ShopperSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_fresh_session_has_empty_state() {
        let shopper = shopper();
        assert_eq!(shopper.state().await.unwrap(), ShopperState::default());
        assert!(shopper.current_user().await.unwrap().is_none());
        assert!(shopper.address_draft().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dispatch_persists_between_reads() {
        let shopper = shopper();
        let id = ProductId::new(4);

        shopper
            .dispatch(ShopperAction::AddToCart {
                product_id: id,
                quantity: 2,
            })
            .await
            .unwrap();
        shopper.dispatch(ShopperAction::ToggleWishlist(id)).await.unwrap();

        let state = shopper.state().await.unwrap();
        assert_eq!(state.cart.membership(id).quantity, 2);
        assert!(state.is_wishlisted(id));
    }

    #[tokio::test]
    async fn test_address_draft_roundtrip() {
        let shopper = shopper();
        let mut draft = AddressFormState::default();
        draft.edit(souk_core::AddressField::PostalCode, "20a81x");

        shopper.set_address_draft(&draft).await.unwrap();
        assert_eq!(
            shopper.address_draft().await.unwrap().unwrap().form.postal_code,
            "2081"
        );

        shopper.clear_address_draft().await.unwrap();
        assert!(shopper.address_draft().await.unwrap().is_none());
    }
}
