//! Cart route handlers.
//!
//! The cart lives in the visitor's shopper state. Adding uses HTMX: the
//! handler returns the count badge and triggers `cart-updated` so other
//! fragments can refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use souk_core::{Price, ProductId, ShopperAction, ShopperState};

use crate::components::Layout;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::services::ShopperSession;
use crate::state::AppState;

/// One cart line ready for display.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub unit: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    /// Discounted unit price.
    pub unit_price: String,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Resolve the cart's lines against the catalog.
    ///
    /// Lines whose product has left the catalog are skipped.
    async fn load(state: &AppState, shopper: &ShopperState) -> Result<Self> {
        let mut lines = Vec::with_capacity(shopper.cart.lines().len());
        let mut subtotal = Decimal::ZERO;

        for line in shopper.cart.lines() {
            let Some(product) = state.catalog().get(line.product_id).await? else {
                tracing::debug!(product_id = %line.product_id, "Skipping cart line for unknown product");
                continue;
            };
            let unit_price = product.display_price();
            let line_total = unit_price.times(line.quantity);
            subtotal += line_total.amount();

            lines.push(CartLineView {
                product_id: product.id.as_i32(),
                name: product.name.clone(),
                unit: product.unit.clone(),
                image_url: product.image_url.clone(),
                quantity: line.quantity,
                unit_price: unit_price.to_string(),
                line_total: line_total.to_string(),
            });
        }

        let subtotal = Price::tnd(subtotal).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            lines,
            subtotal: subtotal.to_string(),
            item_count: shopper.cart.item_count(),
        })
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub quantity: Option<u32>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, shopper, nonce))]
pub async fn show(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
) -> Result<CartShowTemplate> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;

    Ok(CartShowTemplate {
        cart: CartView::load(&state, &shopper_state).await?,
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
    })
}

/// Add item to cart (HTMX).
///
/// Unknown products are 404 and sold-out products 409; neither touches the
/// cart. Returns the count badge and triggers `cart-updated`.
#[instrument(skip(state, shopper))]
pub async fn add(
    State(state): State<AppState>,
    shopper: ShopperSession,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Produit introuvable".to_string()))?;

    if product.stock_quantity == 0 {
        return Err(AppError::Conflict("Rupture de stock".to_string()));
    }

    let quantity = form.quantity.unwrap_or(1).max(1);
    let shopper_state = shopper
        .dispatch(ShopperAction::AddToCart {
            product_id,
            quantity,
        })
        .await?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product_id.to_string()),
            ("quantity", quantity.to_string()),
        ],
    );

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: shopper_state.cart.item_count(),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(shopper))]
pub async fn count(shopper: ShopperSession) -> Result<CartCountTemplate> {
    let shopper_state = shopper.state().await?;
    Ok(CartCountTemplate {
        count: shopper_state.cart.item_count(),
    })
}
