//! In-memory stores.
//!
//! Used by the test suites and for running the storefront without a database.
//! Contents are lost when the process exits.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use souk_core::{DeliveryAddress, Email, ProductId, UserId};

use super::{AddressStore, ProductCatalog, RepositoryError, UserStore};
use crate::models::{Product, User};

/// Delivery addresses keyed by user.
#[derive(Default)]
pub struct MemoryAddressStore {
    addresses: RwLock<HashMap<UserId, DeliveryAddress>>,
}

impl MemoryAddressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AddressStore for MemoryAddressStore {
    async fn save(
        &self,
        user_id: UserId,
        address: &DeliveryAddress,
    ) -> Result<(), RepositoryError> {
        self.addresses
            .write()
            .await
            .insert(user_id, address.clone());
        Ok(())
    }

    async fn find(&self, user_id: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
        Ok(self.addresses.read().await.get(&user_id).cloned())
    }
}

/// Product catalog ordered by ID.
#[derive(Default)]
pub struct MemoryProductCatalog {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl MemoryProductCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-loaded with `products`.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    async fn sorted_by_name(&self, keep: impl Fn(&Product) -> bool) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .await
            .values()
            .filter(|p| keep(p))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

#[async_trait]
impl ProductCatalog for MemoryProductCatalog {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.sorted_by_name(|_| true).await)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn featured(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.sorted_by_name(|p| p.featured).await)
    }

    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }
}

/// Users and password hashes keyed by email.
pub struct MemoryUserStore {
    users: RwLock<HashMap<Email, (User, String)>>,
    next_id: AtomicI32,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            users: RwLock::default(),
            next_id: AtomicI32::new(1),
        }
    }
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let user = User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::Relaxed)),
            email: email.clone(),
            created_at: Utc::now(),
        };
        users.insert(email.clone(), (user.clone(), password_hash.to_owned()));
        Ok(user)
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
