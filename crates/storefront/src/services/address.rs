//! Delivery address submission.
//!
//! Runs the full submit sequence for the address form: validate every field,
//! require a logged-in user, refuse a second save for the same user while one
//! is running, then persist. The caller dispatches the saved address into the
//! shopper state only after this returns `Ok`.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::instrument;

use souk_core::{AddressFormState, DeliveryAddress, FieldErrors, UserId};

use crate::db::{AddressStore, RepositoryError};
use crate::models::CurrentUser;

/// Why a submission did not result in a saved address.
#[derive(Debug, Error)]
pub enum AddressSubmitError {
    /// At least one field failed validation; details are on the form.
    #[error("address form has {} invalid field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("Vous devez être connecté pour enregistrer une adresse.")]
    NotLoggedIn,

    #[error("Un enregistrement est déjà en cours.")]
    SaveInProgress,

    #[error("Échec de l'enregistrement de l'adresse.")]
    Persistence(#[source] RepositoryError),
}

impl AddressSubmitError {
    /// Form-level message, if any. Validation errors are shown per field instead.
    #[must_use]
    pub fn form_message(&self) -> Option<String> {
        match self {
            Self::Validation(_) => None,
            other => Some(other.to_string()),
        }
    }
}

/// Users with an address save currently running.
#[derive(Debug, Default)]
pub struct InFlightSaves {
    users: Mutex<HashSet<UserId>>,
}

impl InFlightSaves {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a save as started for `user_id`.
    ///
    /// Returns `None` if one is already running. The returned guard ends the
    /// save when dropped, whether it succeeded or not.
    #[must_use]
    pub fn try_begin(&self, user_id: UserId) -> Option<SaveGuard<'_>> {
        let inserted = self
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id);
        inserted.then_some(SaveGuard {
            saves: self,
            user_id,
        })
    }

    #[must_use]
    pub fn is_saving(&self, user_id: UserId) -> bool {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }
}

/// Ends an in-flight save on drop.
#[derive(Debug)]
pub struct SaveGuard<'a> {
    saves: &'a InFlightSaves,
    user_id: UserId,
}

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.saves
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

/// Address form submission against an [`AddressStore`].
pub struct AddressService<'a> {
    store: &'a dyn AddressStore,
    in_flight: &'a InFlightSaves,
}

impl<'a> AddressService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn AddressStore, in_flight: &'a InFlightSaves) -> Self {
        Self { store, in_flight }
    }

    /// Submit the form.
    ///
    /// Validation always re-runs and replaces `draft.errors`. Nothing is
    /// persisted unless every field passes.
    ///
    /// # Errors
    ///
    /// See [`AddressSubmitError`]. Persistence failures are logged and
    /// reported to Sentry here; callers only need to show the message.
    #[instrument(skip(self, draft), fields(user_id = user.map(|u| u.id.as_i32())))]
    pub async fn submit(
        &self,
        user: Option<&CurrentUser>,
        draft: &mut AddressFormState,
    ) -> Result<DeliveryAddress, AddressSubmitError> {
        let Some(address) = draft.submit() else {
            return Err(AddressSubmitError::Validation(draft.errors.clone()));
        };

        let user = user.ok_or(AddressSubmitError::NotLoggedIn)?;

        let Some(_guard) = self.in_flight.try_begin(user.id) else {
            tracing::info!("Rejected duplicate address save");
            return Err(AddressSubmitError::SaveInProgress);
        };

        if let Err(e) = self.store.save(user.id, &address).await {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to save delivery address"
            );
            return Err(AddressSubmitError::Persistence(e));
        }

        tracing::info!(region = %address.region, "Delivery address saved");
        Ok(address)
    }

    /// The user's saved address, used to pre-fill the form.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged.
    pub async fn saved(&self, user_id: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
        self.store.find(user_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use souk_core::{AddressField, AddressFieldError, AddressForm, Email};
    use tokio::sync::Notify;

    use super::*;
    use crate::db::memory::MemoryAddressStore;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            email: Email::parse("amel@souk.tn").unwrap(),
        }
    }

    fn valid_draft() -> AddressFormState {
        AddressFormState::new(AddressForm {
            street: "5 Avenue Habib Bourguiba".to_owned(),
            address2: "Immeuble B, 2e étage".to_owned(),
            city: "Sousse".to_owned(),
            region: "Sousse".to_owned(),
            postal_code: "4000".to_owned(),
            ..AddressForm::default()
        })
    }

    struct FailingStore;

    #[async_trait]
    impl AddressStore for FailingStore {
        async fn save(&self, _: UserId, _: &DeliveryAddress) -> Result<(), RepositoryError> {
            Err(RepositoryError::DataCorruption("disk on fire".to_owned()))
        }

        async fn find(&self, _: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
            Ok(None)
        }
    }

    /// Blocks every save until released, counting calls.
    #[derive(Default)]
    struct GatedStore {
        entered: Notify,
        release: Notify,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl AddressStore for GatedStore {
        async fn save(&self, _: UserId, _: &DeliveryAddress) -> Result<(), RepositoryError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }

        async fn find(&self, _: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_valid_submit_saves() {
        let store = MemoryAddressStore::new();
        let in_flight = InFlightSaves::new();
        let service = AddressService::new(&store, &in_flight);

        let mut draft = valid_draft();
        let saved = service.submit(Some(&user()), &mut draft).await.unwrap();

        assert!(draft.errors.is_empty());
        assert_eq!(service.saved(UserId::new(1)).await.unwrap(), Some(saved));
        assert!(!in_flight.is_saving(UserId::new(1)));
    }

    #[tokio::test]
    async fn test_invalid_submit_never_reaches_store() {
        let store = GatedStore::default();
        let in_flight = InFlightSaves::new();
        let service = AddressService::new(&store, &in_flight);

        let mut draft = valid_draft();
        draft.form.city = "   ".to_owned();

        let err = service.submit(Some(&user()), &mut draft).await.unwrap_err();
        let AddressSubmitError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(AddressField::City), Some(AddressFieldError::CityRequired));
        assert_eq!(draft.error(AddressField::City), Some(AddressFieldError::CityRequired));
        assert_eq!(store.saves.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_anonymous_submit_is_refused() {
        let store = MemoryAddressStore::new();
        let in_flight = InFlightSaves::new();
        let service = AddressService::new(&store, &in_flight);

        let err = service.submit(None, &mut valid_draft()).await.unwrap_err();
        assert!(matches!(err, AddressSubmitError::NotLoggedIn));
        assert_eq!(
            err.form_message().as_deref(),
            Some("Vous devez être connecté pour enregistrer une adresse.")
        );
    }

    #[tokio::test]
    async fn test_store_failure_shows_generic_message() {
        let in_flight = InFlightSaves::new();
        let service = AddressService::new(&FailingStore, &in_flight);

        let err = service
            .submit(Some(&user()), &mut valid_draft())
            .await
            .unwrap_err();
        assert!(matches!(err, AddressSubmitError::Persistence(_)));
        assert_eq!(
            err.form_message().as_deref(),
            Some("Échec de l'enregistrement de l'adresse.")
        );
        // The guard is released on failure too.
        assert!(!in_flight.is_saving(UserId::new(1)));
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_save_is_rejected() {
        let store = Arc::new(GatedStore::default());
        let in_flight = Arc::new(InFlightSaves::new());

        let first = {
            let store = Arc::clone(&store);
            let in_flight = Arc::clone(&in_flight);
            tokio::spawn(async move {
                let service = AddressService::new(store.as_ref(), in_flight.as_ref());
                service.submit(Some(&user()), &mut valid_draft()).await
            })
        };

        store.entered.notified().await;
        assert!(in_flight.is_saving(UserId::new(1)));

        let service = AddressService::new(store.as_ref(), in_flight.as_ref());
        let second = service.submit(Some(&user()), &mut valid_draft()).await;
        assert!(matches!(second, Err(AddressSubmitError::SaveInProgress)));

        store.release.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
        assert!(!in_flight.is_saving(UserId::new(1)));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let in_flight = InFlightSaves::new();
        let guard = in_flight.try_begin(UserId::new(3));
        assert!(guard.is_some());
        assert!(in_flight.try_begin(UserId::new(3)).is_none());
        assert!(in_flight.try_begin(UserId::new(4)).is_some());
        drop(guard);
        assert!(in_flight.try_begin(UserId::new(3)).is_some());
    }
}
