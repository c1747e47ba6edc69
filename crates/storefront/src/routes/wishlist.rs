//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State};
use serde::Deserialize;
use tracing::instrument;

use souk_core::{ProductId, ShopperAction};

use crate::error::{AppError, Result};
use crate::services::ShopperSession;
use crate::state::AppState;

/// Wishlist toggle form data.
#[derive(Debug, Deserialize)]
pub struct ToggleWishlistForm {
    pub product_id: i32,
}

/// Wishlist button fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/wishlist_button.html")]
pub struct WishlistButtonTemplate {
    pub product_id: i32,
    pub wishlisted: bool,
}

/// Add or remove a product from the wishlist (HTMX).
///
/// Returns the button in its new state.
#[instrument(skip(state, shopper))]
pub async fn toggle(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Form(form): Form<ToggleWishlistForm>,
) -> Result<WishlistButtonTemplate> {
    let product_id = ProductId::new(form.product_id);
    if state.catalog().get(product_id).await?.is_none() {
        return Err(AppError::NotFound("Produit introuvable".to_string()));
    }

    let shopper_state = shopper
        .dispatch(ShopperAction::ToggleWishlist(product_id))
        .await?;

    Ok(WishlistButtonTemplate {
        product_id: form.product_id,
        wishlisted: shopper_state.is_wishlisted(product_id),
    })
}
