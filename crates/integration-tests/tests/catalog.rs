//! Integration tests for catalog pages and product cards.

use axum::http::StatusCode;

use souk_integration_tests::{TestApp, product};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let mut app = TestApp::new();

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");

    // Without a database the storefront is always ready.
    let resp = app.get("/health/ready").await;
    assert_eq!(resp.status, StatusCode::OK);
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let mut app = TestApp::new();

    let resp = app.get("/").await;
    assert!(resp.header("content-security-policy").is_some());
    assert!(resp.header("x-request-id").is_some());
}

#[tokio::test]
async fn test_page_nonce_matches_csp_header() {
    let mut app = TestApp::new();

    let resp = app.get("/").await;
    let csp = resp.header("content-security-policy").unwrap_or_default();
    let nonce = csp
        .split("'nonce-")
        .nth(1)
        .and_then(|rest| rest.split('\'').next())
        .unwrap_or_default();

    assert_eq!(nonce.len(), 24);
    assert!(resp.body.contains(&format!(r#"<script nonce="{nonce}""#)));

    // A fresh nonce per request.
    let again = app.get("/").await;
    assert_ne!(again.header("content-security-policy"), Some(csp));
}

// ============================================================================
// Product cards
// ============================================================================

#[tokio::test]
async fn test_discounted_card_shows_both_prices() {
    let mut app = TestApp::new();

    let resp = app.get("/products/1").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("-20%"));
    assert!(resp.body.contains(r#"<s class="original">12.50 TND</s>"#));
    assert!(resp.body.contains(r#"<strong class="current">10.00 TND</strong>"#));
    assert!(resp.body.contains("En vedette"));
    assert!(resp.body.contains("4.7"));
}

#[tokio::test]
async fn test_undiscounted_card_has_no_original_price() {
    let mut app = TestApp::new();

    let resp = app.get("/products/2").await;

    assert!(!resp.body.contains(r#"class="original""#));
    assert!(resp.body.contains("18.90 TND"));
    assert!(resp.body.contains("Il ne reste que 3"));
}

#[tokio::test]
async fn test_out_of_stock_card_disables_button() {
    let mut app = TestApp::new();

    let resp = app.get("/products/3").await;

    assert!(resp.body.contains("sold-out"));
    assert!(resp.body.contains(r#"class="add-to-cart" disabled>Rupture de stock</button>"#));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let mut app = TestApp::new();

    let resp = app.get("/products/404").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_tag_filter() {
    let mut app = TestApp::new();

    let resp = app.get("/products?tag=bio").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Dattes Deglet Nour"));
    assert!(!resp.body.contains("Tomates"));
    // Only the first two tags are listed on a card.
    assert!(resp.body.contains("+1"));
}

#[tokio::test]
async fn test_listing_paginates() {
    let products = (1..=30).map(|id| product(id, &format!("Produit {id:02}"), 1_000, 0, 50));
    let mut app = TestApp::with_products(products.collect());

    let first = app.get("/products").await;
    assert!(first.body.contains("Produit 01"));
    assert!(!first.body.contains("Produit 25"));

    let second = app.get("/products?page=2").await;
    assert!(second.body.contains("Produit 25"));
    assert!(!second.body.contains("Produit 01"));
}

// ============================================================================
// Home
// ============================================================================

#[tokio::test]
async fn test_home_shows_featured_and_recently_viewed() {
    let mut app = TestApp::new();

    let resp = app.get("/").await;
    assert!(resp.body.contains("Dattes Deglet Nour"));
    assert!(!resp.body.contains("Vus récemment"));

    app.get("/products/3").await;
    let resp = app.get("/").await;
    assert!(resp.body.contains("Vus récemment"));
    assert!(resp.body.contains("Tomates"));
}

// ============================================================================
// Wishlist
// ============================================================================

#[tokio::test]
async fn test_wishlist_toggle() {
    let mut app = TestApp::new();

    let resp = app
        .htmx_post_form("/wishlist/toggle", &[("product_id", "2")])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains(r#"aria-pressed="true""#));

    let resp = app
        .htmx_post_form("/wishlist/toggle", &[("product_id", "2")])
        .await;
    assert!(resp.body.contains(r#"aria-pressed="false""#));
}

#[tokio::test]
async fn test_wishlist_unknown_product() {
    let mut app = TestApp::new();

    let resp = app
        .post_form("/wishlist/toggle", &[("product_id", "99")])
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
