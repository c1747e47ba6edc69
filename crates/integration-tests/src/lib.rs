//! Integration tests for the Souk storefront.
//!
//! Tests drive the full router in-process: every request goes through the
//! same middleware stack as production, with in-memory stores and an
//! in-memory session store in place of `PostgreSQL`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p souk-integration-tests
//! ```

#![allow(clippy::expect_used)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use souk_core::{DiscountPercent, Price, ProductId};
use souk_storefront::app;
use souk_storefront::config::{SentryConfig, StorefrontConfig};
use souk_storefront::db::AddressStore;
use souk_storefront::db::memory::{MemoryAddressStore, MemoryProductCatalog, MemoryUserStore};
use souk_storefront::middleware::{SESSION_COOKIE_NAME, create_session_layer};
use souk_storefront::models::Product;
use souk_storefront::state::{AppState, Stores};

/// Client IP sent by proxied visitors so the rate limiters can key on it.
const CLIENT_IP: &str = "197.0.2.10";

/// Peer address of visitors that connect without a reverse proxy.
const DIRECT_PEER: SocketAddr = SocketAddr::new(
    IpAddr::V4(Ipv4Addr::new(41, 229, 7, 12)),
    51_234,
);

/// Password used by [`TestApp::register`].
pub const TEST_PASSWORD: &str = "jasmin-et-menthe";

/// Configuration for an in-process storefront.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/souk_test"),
        host: [127, 0, 0, 1].into(),
        port: 3000,
        base_url: url::Url::parse("http://localhost:3000").expect("valid test URL"),
        session_secret: SecretString::from(
            "Qm9uam91ciBkZXB1aXMgbGUgc291ayBkZSBUdW5pcywgbWVyY2kgcG91ciB2b3RyZSB2aXNpdGUh",
        ),
        catalog_cache_ttl: Duration::from_secs(60),
        sentry: SentryConfig::default(),
    }
}

/// Build a product priced in dinars.
///
/// `price` is given in millimes to keep call sites exact.
#[must_use]
pub fn product(id: i32, name: &str, price_millimes: i64, discount: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: format!("{name} du marché"),
        base_price: Price::tnd(Decimal::new(price_millimes, 3)).expect("non-negative price"),
        discount: DiscountPercent::new(discount).expect("discount within 0-100"),
        stock_quantity: stock,
        unit: "kg".to_owned(),
        supplier_name: None,
        tags: Vec::new(),
        featured: false,
        image_url: None,
        rating: None,
        review_count: 0,
    }
}

/// A small catalog covering the stock and discount cases.
#[must_use]
pub fn sample_catalog() -> Vec<Product> {
    let mut dates = product(1, "Dattes Deglet Nour", 12_500, 20, 40);
    dates.featured = true;
    dates.tags = vec!["fruits".to_owned(), "local".to_owned(), "bio".to_owned()];
    dates.rating = Some(Decimal::new(47, 1));
    dates.review_count = 128;

    let oil = product(2, "Huile d'olive", 18_900, 0, 3);
    let tomatoes = product(3, "Tomates", 1_800, 0, 0);

    vec![dates, oil, tomatoes]
}

/// A response with its body read to a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// A response header as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// One visitor talking to a fresh storefront.
///
/// The session cookie is carried between requests like a browser would.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
    /// Set for visitors that reach the server directly, with no proxy headers.
    peer: Option<SocketAddr>,
}

impl TestApp {
    /// A storefront over [`sample_catalog`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_products(sample_catalog())
    }

    /// A storefront over the given catalog.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self::build(products, Arc::new(MemoryAddressStore::new()))
    }

    /// A storefront over [`sample_catalog`] that keeps addresses in `addresses`.
    ///
    /// Used to make address saves fail or stall.
    #[must_use]
    pub fn with_address_store(addresses: Arc<dyn AddressStore>) -> Self {
        Self::build(sample_catalog(), addresses)
    }

    fn build(products: Vec<Product>, addresses: Arc<dyn AddressStore>) -> Self {
        let config = test_config();
        let session_layer = create_session_layer(MemoryStore::default(), &config)
            .expect("test session secret is long enough");
        let stores = Stores {
            addresses,
            products: Arc::new(MemoryProductCatalog::with_products(products)),
            users: Arc::new(MemoryUserStore::new()),
        };
        let state = AppState::with_stores(config, stores);

        Self {
            router: app(state, session_layer),
            cookie: None,
            peer: None,
        }
    }

    /// A second visitor on the same storefront, with no cookies.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            peer: None,
        }
    }

    /// A visitor with no cookies that connects without a reverse proxy.
    ///
    /// Requests carry no client IP headers, only the peer address the
    /// server sees on the socket.
    #[must_use]
    pub fn direct_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
            peer: Some(DIRECT_PEER),
        }
    }

    /// Another tab of the same browser: shares this visitor's session.
    #[must_use]
    pub fn new_tab(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: self.cookie.clone(),
            peer: self.peer,
        }
    }

    /// Issue a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// Issue a GET request as HTMX would.
    pub async fn htmx_get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).header("hx-request", "true"), Body::empty())
            .await
    }

    /// POST a urlencoded form.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(uri), encode(fields)).await
    }

    /// POST a urlencoded form as HTMX would.
    pub async fn htmx_post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(uri).header("hx-request", "true"), encode(fields))
            .await
    }

    /// Register (and thereby log in) `email` with [`TEST_PASSWORD`].
    pub async fn register(&mut self, email: &str) -> TestResponse {
        self.post_form(
            "/auth/register",
            &[
                ("email", email),
                ("password", TEST_PASSWORD),
                ("password_confirm", TEST_PASSWORD),
            ],
        )
        .await
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let mut builder = match self.peer {
            Some(peer) => builder.extension(ConnectInfo(peer)),
            None => builder.header("x-forwarded-for", CLIENT_IP),
        };
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder.body(body).expect("valid test request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(cookie) = session_cookie(response.headers()) {
            self.cookie = Some(cookie);
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn form_request(uri: &str) -> axum::http::request::Builder {
    Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
}

fn encode(fields: &[(&str, &str)]) -> Body {
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    Body::from(encoded)
}

/// The `name=value` pair of the session cookie from `Set-Cookie`, if any.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_owned)
}
