//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use souk_core::{ProductId, ShopperAction};

use crate::components::{CardVariant, Layout, ProductCard};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::services::ShopperSession;
use crate::state::AppState;

/// Products shown per catalog page.
const PAGE_SIZE: usize = 24;

/// Catalog query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub page: Option<usize>,
    /// Only show products carrying this tag.
    pub tag: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCard>,
    pub tag: Option<String>,
    pub current_page: usize,
    pub total_pages: usize,
}

impl ProductsIndexTemplate {
    /// Query string for another page, keeping the tag filter.
    #[must_use]
    pub fn page_query(&self, page: usize) -> String {
        match &self.tag {
            Some(tag) => {
                let tag: String = url::form_urlencoded::byte_serialize(tag.as_bytes()).collect();
                format!("?tag={tag}&page={page}")
            }
            None => format!("?page={page}"),
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub layout: Layout,
    pub card: ProductCard,
    /// All tags; the card only carries the first few.
    pub tags: Vec<String>,
}

/// Display the product catalog.
#[instrument(skip(state, shopper, nonce))]
pub async fn index(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate> {
    let user = shopper.current_user().await?;
    let shopper_state = shopper.state().await?;

    let catalog = state.catalog().list().await?;
    let tag = query.tag.filter(|t| !t.trim().is_empty());
    let matching: Vec<_> = catalog
        .iter()
        .filter(|p| tag.as_ref().is_none_or(|t| p.tags.iter().any(|pt| pt == t)))
        .collect();

    let total_pages = matching.len().div_ceil(PAGE_SIZE).max(1);
    let current_page = query.page.unwrap_or(1).clamp(1, total_pages);
    let page = matching
        .into_iter()
        .skip((current_page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE);

    Ok(ProductsIndexTemplate {
        products: ProductCard::many(page, &shopper_state, CardVariant::Default),
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
        tag,
        current_page,
        total_pages,
    })
}

/// Display a product detail page.
///
/// Viewing a product records it in the visitor's recently viewed list.
#[instrument(skip(state, shopper, nonce))]
pub async fn show(
    State(state): State<AppState>,
    shopper: ShopperSession,
    CspNonce(nonce): CspNonce,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product_id = ProductId::new(id);
    let product = state
        .catalog()
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Produit {id} introuvable")))?;

    add_breadcrumb("product", "Viewed product", &[("product_id", id.to_string())]);

    let user = shopper.current_user().await?;
    let shopper_state = shopper
        .dispatch(ShopperAction::AddToRecentlyViewed(product_id))
        .await?;

    Ok(ProductShowTemplate {
        card: ProductCard::new(&product, &shopper_state, CardVariant::Default),
        tags: product.tags.clone(),
        layout: Layout::new(nonce, &shopper_state, user.as_ref()),
    })
}
