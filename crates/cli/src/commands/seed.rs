//! Seed the catalog from a YAML file.
//!
//! Each entry is upserted by ID, so re-running the command with an edited
//! file updates prices and stock in place.
//!
//! ```yaml
//! - id: 1
//!   name: Dattes Deglet Nour
//!   description: Dattes fraîches de Tozeur
//!   price: "12.500"
//!   discount: 10
//!   stock: 40
//!   unit: kg
//!   tags: [fruits, local]
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use souk_core::{DiscountPercent, Price, ProductId};
use souk_storefront::db::{self, PgProductCatalog, ProductCatalog};
use souk_storefront::models::Product;

use super::{CommandError, database_url};

/// One product entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base price in dinars.
    pub price: Decimal,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub stock: u32,
    pub unit: String,
    pub supplier: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    pub image_url: Option<String>,
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub review_count: u32,
}

impl TryFrom<SeedProduct> for Product {
    type Error = CommandError;

    fn try_from(seed: SeedProduct) -> Result<Self, Self::Error> {
        let id = seed.id;
        let invalid = move |reason: String| CommandError::InvalidProduct { id, reason };
        let base_price = Price::tnd(seed.price).map_err(|e| invalid(e.to_string()))?;
        let discount = DiscountPercent::new(seed.discount).map_err(|e| invalid(e.to_string()))?;
        if seed.name.trim().is_empty() {
            return Err(invalid("name cannot be empty".to_owned()));
        }

        Ok(Self {
            id: ProductId::new(seed.id),
            name: seed.name,
            description: seed.description,
            base_price,
            discount,
            stock_quantity: seed.stock,
            unit: seed.unit,
            supplier_name: seed.supplier,
            tags: seed.tags,
            featured: seed.featured,
            image_url: seed.image_url,
            rating: seed.rating,
            review_count: seed.review_count,
        })
    }
}

/// Parse and validate every product in a seed file body.
///
/// # Errors
///
/// Returns an error on malformed YAML or the first invalid product.
pub fn parse_products(content: &str) -> Result<Vec<Product>, CommandError> {
    let seeds: Vec<SeedProduct> = serde_yaml::from_str(content)?;
    seeds.into_iter().map(Product::try_from).collect()
}

/// Upsert all products from `file`.
///
/// The file is validated in full before connecting to the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any product is
/// invalid, or a database write fails.
pub async fn products(file: &Path) -> Result<(), CommandError> {
    info!(path = %file.display(), "Loading products from file");

    let content = tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CommandError::Io {
            path: file.display().to_string(),
            source,
        })?;
    let products = parse_products(&content)?;
    info!(count = products.len(), "Parsed products");

    let pool = db::create_pool(&database_url()?).await?;
    let catalog = PgProductCatalog::new(pool);

    for product in &products {
        catalog.upsert(product).await?;
        info!(id = %product.id, name = %product.name, "Upserted product");
    }

    info!(count = products.len(), "Seeding complete");
    Ok(())
}
