//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                         - Home page (featured, recently viewed)
//! GET  /health                   - Liveness
//! GET  /health/ready             - Readiness (database ping)
//!
//! # Products
//! GET  /products                 - Catalog grid (?tag=, ?page=)
//! GET  /products/{id}            - Product detail, records recently viewed
//!
//! # Cart (HTMX fragments)
//! GET  /cart                     - Cart page
//! POST /cart/add                 - Add to cart (returns count badge, triggers cart-updated)
//! GET  /cart/count               - Cart count badge (fragment)
//!
//! # Wishlist
//! POST /wishlist/toggle          - Toggle membership (returns button fragment)
//!
//! # Auth
//! GET  /auth/login               - Login page
//! POST /auth/login               - Login action
//! GET  /auth/register            - Register page
//! POST /auth/register            - Register action
//! POST /auth/logout              - Logout action
//!
//! # Delivery address
//! GET  /account/address          - Address form (?return_to=)
//! POST /account/address          - Submit the form
//! POST /account/address/field    - Single field edit (HTMX)
//! POST /account/address/clear    - Reset the form
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod home;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// The POST handlers are rate limited per client IP.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/login", post(auth::login).layer(auth_rate_limiter()))
        .route("/register", get(auth::register_page))
        .route("/register", post(auth::register).layer(auth_rate_limiter()))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add).layer(form_rate_limiter()))
        .route("/count", get(cart::count))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/address", get(account::show))
        .route("/address", post(account::submit).layer(form_rate_limiter()))
        .route("/address/field", post(account::edit_field))
        .route("/address/clear", post(account::clear))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/wishlist/toggle", post(wishlist::toggle))
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.is_ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Whether the request was issued by HTMX.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("hx-request")
        .is_some_and(|v| v.as_bytes() == b"true")
}

/// A local path to redirect to, or `default`.
///
/// Only absolute paths on this site are accepted, so `return_to` cannot be
/// used as an open redirect (`//host` and `/\host` are refused).
pub(crate) fn safe_return_path<'a>(candidate: Option<&'a str>, default: &'a str) -> &'a str {
    match candidate.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.starts_with("/\\")
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => default,
    }
}
