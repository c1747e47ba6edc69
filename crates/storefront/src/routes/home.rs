//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::components::{CardVariant, Layout, ProductCard};
use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::services::ShopperSession;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub featured: Vec<ProductCard>,
    /// Most recent first, rendered as compact cards.
    pub recently_viewed: Vec<ProductCard>,
}

/// Display the home page.
#[instrument(skip(state, shopper, nonce))]
pub async fn home(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
) -> Result<HomeTemplate> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;

    let featured = state.catalog().featured().await?;
    let recent = state
        .catalog()
        .get_many(&shopper_state.recently_viewed)
        .await?;

    Ok(HomeTemplate {
        featured: ProductCard::many(featured.iter(), &shopper_state, CardVariant::Default),
        recently_viewed: ProductCard::many(
            recent.iter().map(AsRef::as_ref),
            &shopper_state,
            CardVariant::Compact,
        ),
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
    })
}
