//! Cached read access to the product catalog.
//!
//! Products and listings are cached with `moka` (5-minute TTL by default).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use souk_core::ProductId;

use crate::db::{ProductCatalog, RepositoryError};
use crate::models::Product;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Product(ProductId),
    All,
    Featured,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Arc<Product>),
    Products(Arc<[Product]>),
}

/// Catalog reads through a TTL cache; writes go straight to the store and
/// invalidate.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ProductCatalog>,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn ProductCatalog>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();
        Self { store, cache }
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns the store's error on a cache miss that fails to load.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Arc<Product>>, RepositoryError> {
        if let Some(CacheValue::Product(product)) = self.cache.get(&CacheKey::Product(id)).await {
            debug!("Cache hit for product");
            return Ok(Some(product));
        }

        let Some(product) = self.store.get(id).await? else {
            return Ok(None);
        };
        let product = Arc::new(product);
        self.cache
            .insert(CacheKey::Product(id), CacheValue::Product(Arc::clone(&product)))
            .await;
        Ok(Some(product))
    }

    /// All products, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns the store's error on a cache miss that fails to load.
    pub async fn list(&self) -> Result<Arc<[Product]>, RepositoryError> {
        self.cached_list(CacheKey::All).await
    }

    /// Featured products, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns the store's error on a cache miss that fails to load.
    pub async fn featured(&self) -> Result<Arc<[Product]>, RepositoryError> {
        self.cached_list(CacheKey::Featured).await
    }

    /// Products for the given IDs, in that order, skipping unknown IDs.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn get_many(&self, ids: &[ProductId]) -> Result<Vec<Arc<Product>>, RepositoryError> {
        let mut products = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(product) = self.get(*id).await? {
                products.push(product);
            }
        }
        Ok(products)
    }

    /// Write a product and drop every cached read.
    ///
    /// # Errors
    ///
    /// Returns the store's error.
    pub async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.store.upsert(product).await?;
        self.invalidate_all().await;
        Ok(())
    }

    /// Invalidate all cached data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    #[instrument(skip(self))]
    async fn cached_list(&self, key: CacheKey) -> Result<Arc<[Product]>, RepositoryError> {
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Arc<[Product]> = match key {
            CacheKey::Featured => self.store.featured().await?,
            CacheKey::All | CacheKey::Product(_) => self.store.list().await?,
        }
        .into();
        self.cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }
}
