//! Integration tests for the delivery address form.
//!
//! Covers validation, the login requirement, per-field HTMX edits, clearing
//! and the post-save redirect.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use tokio::sync::Notify;

use souk_core::{DeliveryAddress, UserId};
use souk_integration_tests::TestApp;
use souk_storefront::db::memory::MemoryAddressStore;
use souk_storefront::db::{AddressStore, RepositoryError};

const VALID_ADDRESS: [(&str, &str); 6] = [
    ("street", "12 rue de Marseille"),
    ("address2", "Appartement 4, 2e étage"),
    ("city", "Tunis"),
    ("region", "Tunis"),
    ("postal_code", "1002"),
    ("instructions", "Sonner deux fois"),
];

fn with_return_to<'a>(return_to: &'a str) -> Vec<(&'a str, &'a str)> {
    let mut fields = VALID_ADDRESS.to_vec();
    fields.push(("return_to", return_to));
    fields
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_invalid_submit_shows_every_field_error() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;

    let resp = app
        .post_form(
            "/account/address",
            &[
                ("street", "12 rue de Marseille"),
                ("address2", "Appartement 4"),
                ("city", "  "),
                ("region", "Tunis"),
                ("postal_code", "10a"),
            ],
        )
        .await;

    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.body.contains("La ville est requise"));
    assert!(resp.body.contains("Le code postal doit contenir 4 chiffres"));
    // Non-digits are stripped before validation.
    assert!(resp.body.contains(r#"name="postal_code" value="10""#));
    assert!(resp.body.contains("12 rue de Marseille"));
}

#[tokio::test]
async fn test_field_edit_clears_only_that_error() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;
    app.post_form(
        "/account/address",
        &[("street", "12 rue de Marseille"), ("region", "Tunis")],
    )
    .await;

    let resp = app
        .htmx_post_form(
            "/account/address/field",
            &[("field", "city"), ("city", "La Marsa")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("La ville est requise"));
    assert!(resp.body.contains("Le code postal est requis"));
    assert!(resp.body.contains(r#"value="La Marsa""#));
    // HTMX gets the fragment only.
    assert!(resp.body.starts_with("<form"));
}

#[tokio::test]
async fn test_postal_code_edit_is_sanitized() {
    let mut app = TestApp::new();

    let resp = app
        .htmx_post_form(
            "/account/address/field",
            &[("field", "postal_code"), ("postal_code", "20 8 0 99")],
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"value="2080""#));
}

// ============================================================================
// Login requirement
// ============================================================================

#[tokio::test]
async fn test_anonymous_submit_is_unauthorized_and_keeps_input() {
    let mut app = TestApp::new();

    let resp = app.post_form("/account/address", &VALID_ADDRESS).await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(resp.body.contains("Vous devez être connecté pour enregistrer une adresse."));

    let resp = app.get("/account/address").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"value="12 rue de Marseille""#));
    assert!(resp.body.contains("Connectez-vous"));
}

// ============================================================================
// Saving
// ============================================================================

#[tokio::test]
async fn test_save_redirects_to_return_to() {
    let mut app = TestApp::new();
    let resp = app.register("amira@souk.tn").await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let resp = app
        .post_form("/account/address", &with_return_to("/cart"))
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/cart"));

    let resp = app.get("/account/address").await;
    assert!(resp.body.contains("Adresse enregistrée"));
    assert!(resp.body.contains("1002 Tunis"));
    assert!(resp.body.contains(">Sonner deux fois</textarea>"));
}

#[tokio::test]
async fn test_htmx_save_uses_hx_redirect() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;

    let resp = app
        .htmx_post_form("/account/address", &with_return_to("/cart"))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("hx-redirect"), Some("/cart"));
    assert_eq!(resp.header("hx-trigger"), Some("address-saved"));
}

#[tokio::test]
async fn test_external_return_to_is_ignored() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;

    let resp = app
        .post_form("/account/address", &with_return_to("//evil.example"))
        .await;

    assert_eq!(resp.status, StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/account/address"));
}

#[tokio::test]
async fn test_saved_address_prefills_on_another_device() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;
    app.post_form("/account/address", &VALID_ADDRESS).await;

    let mut other = app.new_visitor();
    let resp = other.get("/account/address").await;
    assert!(!resp.body.contains("12 rue de Marseille"));

    let resp = other
        .post_form(
            "/auth/login",
            &[
                ("email", "amira@souk.tn"),
                ("password", souk_integration_tests::TEST_PASSWORD),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let resp = other.get("/account/address").await;
    assert!(resp.body.contains(r#"value="12 rue de Marseille""#));
}

#[tokio::test]
async fn test_logout_forgets_address_for_the_next_user() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;
    app.post_form("/account/address", &VALID_ADDRESS).await;
    app.post_form("/cart/add", &[("product_id", "1"), ("quantity", "1")])
        .await;

    let resp = app.post_form("/auth/logout", &[]).await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let resp = app.get("/account/address").await;
    assert!(!resp.body.contains("Adresse enregistrée"));
    assert!(!resp.body.contains("12 rue de Marseille"));
    assert!(!resp.body.contains("Sonner deux fois"));

    let resp = app.htmx_get("/cart/count").await;
    assert!(resp.body.contains(">1</span>"));

    app.register("sami@souk.tn").await;
    let resp = app.get("/account/address").await;
    assert!(!resp.body.contains("Adresse enregistrée"));
    assert!(!resp.body.contains("12 rue de Marseille"));

    // Nothing left over for the second account to save.
    let resp = app.post_form("/account/address", &[]).await;
    assert_eq!(resp.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_restores_own_address_over_previous_one() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;
    app.post_form("/account/address", &VALID_ADDRESS).await;

    let mut sami = app.new_visitor();
    sami.register("sami@souk.tn").await;
    sami.post_form(
        "/account/address",
        &[
            ("street", "7 avenue Habib Bourguiba"),
            ("address2", "Villa 3"),
            ("city", "Sousse"),
            ("region", "Sousse"),
            ("postal_code", "4000"),
        ],
    )
    .await;
    sami.post_form("/auth/logout", &[]).await;

    let resp = sami
        .post_form(
            "/auth/login",
            &[
                ("email", "amira@souk.tn"),
                ("password", souk_integration_tests::TEST_PASSWORD),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::SEE_OTHER);

    let resp = sami.get("/account/address").await;
    assert!(resp.body.contains("1002 Tunis"));
    assert!(!resp.body.contains("7 avenue Habib Bourguiba"));
}

// ============================================================================
// Save failures
// ============================================================================

/// An address store whose writes always fail.
struct BrokenAddressStore;

#[async_trait]
impl AddressStore for BrokenAddressStore {
    async fn save(&self, _: UserId, _: &DeliveryAddress) -> Result<(), RepositoryError> {
        Err(RepositoryError::DataCorruption("addresses table unreadable".to_owned()))
    }

    async fn find(&self, _: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
        Ok(None)
    }
}

/// An address store whose writes wait until the test releases them.
#[derive(Default)]
struct GatedAddressStore {
    inner: MemoryAddressStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl AddressStore for GatedAddressStore {
    async fn save(
        &self,
        user_id: UserId,
        address: &DeliveryAddress,
    ) -> Result<(), RepositoryError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.save(user_id, address).await
    }

    async fn find(&self, user_id: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
        self.inner.find(user_id).await
    }
}

#[tokio::test]
async fn test_failed_save_shows_generic_error_and_keeps_input() {
    let mut app = TestApp::with_address_store(Arc::new(BrokenAddressStore));
    app.register("amira@souk.tn").await;

    let resp = app.post_form("/account/address", &VALID_ADDRESS).await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    // Apostrophes are HTML-escaped in the rendered message.
    assert!(resp.body.contains("Échec de l"));
    assert!(!resp.body.contains("addresses table unreadable"));
    assert!(!resp.body.contains("Adresse enregistrée"));
    assert!(resp.body.contains(r#"value="12 rue de Marseille""#));

    let resp = app.get("/account/address").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("Adresse enregistrée"));
    assert!(resp.body.contains(r#"value="12 rue de Marseille""#));
}

#[tokio::test]
async fn test_second_save_while_first_in_flight_is_rejected() {
    let store = Arc::new(GatedAddressStore::default());
    let mut app = TestApp::with_address_store(store.clone());
    app.register("amira@souk.tn").await;
    let mut other_tab = app.new_tab();

    let (first, second) = tokio::join!(
        app.post_form("/account/address", &VALID_ADDRESS),
        async {
            store.entered.notified().await;
            let resp = other_tab.post_form("/account/address", &VALID_ADDRESS).await;
            store.release.notify_one();
            resp
        }
    );

    assert_eq!(second.status, StatusCode::CONFLICT);
    assert!(second.body.contains("Un enregistrement est déjà en cours."));
    assert_eq!(first.status, StatusCode::SEE_OTHER);
}

// ============================================================================
// Clearing
// ============================================================================

#[tokio::test]
async fn test_clear_resets_input_and_errors() {
    let mut app = TestApp::new();
    app.register("amira@souk.tn").await;
    app.post_form("/account/address", &[("street", "12 rue de Marseille")])
        .await;

    let resp = app
        .htmx_post_form("/account/address/clear?return_to=/cart", &[])
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(!resp.body.contains("12 rue de Marseille"));
    assert!(!resp.body.contains("La ville est requise"));
    assert!(resp.body.contains(r#"name="return_to" value="/cart""#));
    assert!(resp.body.contains(r#"value="Tunisie""#));
}
