//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    AddressStore, PgAddressStore, PgProductCatalog, PgUserStore, ProductCatalog, UserStore,
};
use crate::services::{AddressService, AuthService, CatalogService, InFlightSaves};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like stores and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    /// Present when backed by `PostgreSQL`; used by the readiness check.
    pool: Option<PgPool>,
    addresses: Arc<dyn AddressStore>,
    users: Arc<dyn UserStore>,
    catalog: CatalogService,
    in_flight_saves: InFlightSaves,
}

/// The stores backing an [`AppState`].
pub struct Stores {
    pub addresses: Arc<dyn AddressStore>,
    pub products: Arc<dyn ProductCatalog>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            addresses: Arc::new(PgAddressStore::new(pool.clone())),
            products: Arc::new(PgProductCatalog::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
        }
    }
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let stores = Stores::postgres(&pool);
        Self::build(config, Some(pool), stores)
    }

    /// Create application state over arbitrary stores, without a database.
    #[must_use]
    pub fn with_stores(config: StorefrontConfig, stores: Stores) -> Self {
        Self::build(config, None, stores)
    }

    fn build(config: StorefrontConfig, pool: Option<PgPool>, stores: Stores) -> Self {
        let catalog = CatalogService::new(stores.products, config.catalog_cache_ttl);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                addresses: stores.addresses,
                users: stores.users,
                catalog,
                in_flight_saves: InFlightSaves::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool, if any.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Get the cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Address form submission bound to this state's store.
    #[must_use]
    pub fn address_service(&self) -> AddressService<'_> {
        AddressService::new(self.inner.addresses.as_ref(), &self.inner.in_flight_saves)
    }

    /// Password authentication bound to this state's user store.
    #[must_use]
    pub fn auth_service(&self) -> AuthService<'_> {
        AuthService::new(self.inner.users.as_ref())
    }

    /// Whether the backing database answers; always true without one.
    pub async fn is_ready(&self) -> bool {
        match self.pool() {
            Some(pool) => {
                let ping = sqlx::query("SELECT 1").fetch_one(pool);
                matches!(tokio::time::timeout(Duration::from_secs(2), ping).await, Ok(Ok(_)))
            }
            None => true,
        }
    }
}
