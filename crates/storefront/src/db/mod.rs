//! Persistence for the storefront.
//!
//! # Database
//!
//! Everything lives in the `storefront` schema:
//!
//! - `user`, `user_password` - Site authentication
//! - `delivery_address` - One saved delivery address per user
//! - `product` - The grocery catalog
//!
//! Sessions are stored by tower-sessions in `tower_sessions.session`.
//!
//! Each store is a trait so handlers can run against `PostgreSQL` in
//! production and the [`memory`] stores in tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p souk-cli -- migrate
//! ```

pub mod addresses;
pub mod memory;
pub mod products;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use souk_core::{DeliveryAddress, Email, ProductId, UserId};

use crate::models::{Product, User};

pub use addresses::PgAddressStore;
pub use products::PgProductCatalog;
pub use users::PgUserStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence for saved delivery addresses.
///
/// A user has at most one address; saving replaces it wholesale.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Create or replace the user's delivery address.
    async fn save(&self, user_id: UserId, address: &DeliveryAddress)
    -> Result<(), RepositoryError>;

    /// The user's saved delivery address, if any.
    async fn find(&self, user_id: UserId) -> Result<Option<DeliveryAddress>, RepositoryError>;
}

/// Read and write access to the product catalog.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Every product, ordered by name.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Products flagged as featured, ordered by name.
    async fn featured(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Insert the product or overwrite the one with the same ID.
    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError>;
}

/// User accounts with password credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user together with their password hash.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the email is taken.
    async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError>;

    /// Look up a user and their password hash by email.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}
