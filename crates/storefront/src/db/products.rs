//! `PostgreSQL` product catalog.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use souk_core::{DiscountPercent, Price, ProductId};

use super::{ProductCatalog, RepositoryError};
use crate::models::Product;

const LIST_PRODUCTS: &str = r"
    SELECT id, name, description, base_price, discount, stock_quantity, unit,
           supplier_name, tags, featured, image_url, rating, review_count
    FROM storefront.product
    ORDER BY name
";

const LIST_FEATURED: &str = r"
    SELECT id, name, description, base_price, discount, stock_quantity, unit,
           supplier_name, tags, featured, image_url, rating, review_count
    FROM storefront.product
    WHERE featured
    ORDER BY name
";

const GET_PRODUCT: &str = r"
    SELECT id, name, description, base_price, discount, stock_quantity, unit,
           supplier_name, tags, featured, image_url, rating, review_count
    FROM storefront.product
    WHERE id = $1
";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    base_price: Decimal,
    discount: i16,
    stock_quantity: i32,
    unit: String,
    supplier_name: Option<String>,
    tags: Vec<String>,
    featured: bool,
    image_url: Option<String>,
    rating: Option<Decimal>,
    review_count: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let base_price = Price::tnd(row.base_price).map_err(|e| corrupt(id, "price", &e))?;
        let discount = DiscountPercent::new(i64::from(row.discount))
            .map_err(|e| corrupt(id, "discount", &e))?;
        let stock_quantity =
            u32::try_from(row.stock_quantity).map_err(|e| corrupt(id, "stock quantity", &e))?;
        let review_count =
            u32::try_from(row.review_count).map_err(|e| corrupt(id, "review count", &e))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            base_price,
            discount,
            stock_quantity,
            unit: row.unit,
            supplier_name: row.supplier_name,
            tags: row.tags,
            featured: row.featured,
            image_url: row.image_url,
            rating: row.rating,
            review_count,
        })
    }
}

fn corrupt(id: i32, what: &str, e: &dyn std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("invalid {what} for product {id}: {e}"))
}

/// Catalog backed by `storefront.product`.
#[derive(Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self, sql: &'static str) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_all(LIST_PRODUCTS).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(GET_PRODUCT)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Product::try_from).transpose()
    }

    async fn featured(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch_all(LIST_FEATURED).await
    }

    async fn upsert(&self, product: &Product) -> Result<(), RepositoryError> {
        let stock_quantity = i32::try_from(product.stock_quantity).map_err(|_| {
            RepositoryError::Conflict(format!("stock quantity too large for product {}", product.id))
        })?;
        let review_count = i32::try_from(product.review_count).map_err(|_| {
            RepositoryError::Conflict(format!("review count too large for product {}", product.id))
        })?;

        sqlx::query(
            r"
            INSERT INTO storefront.product
                (id, name, description, base_price, discount, stock_quantity, unit,
                 supplier_name, tags, featured, image_url, rating, review_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                base_price = EXCLUDED.base_price,
                discount = EXCLUDED.discount,
                stock_quantity = EXCLUDED.stock_quantity,
                unit = EXCLUDED.unit,
                supplier_name = EXCLUDED.supplier_name,
                tags = EXCLUDED.tags,
                featured = EXCLUDED.featured,
                image_url = EXCLUDED.image_url,
                rating = EXCLUDED.rating,
                review_count = EXCLUDED.review_count,
                updated_at = NOW()
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.base_price.amount())
        .bind(i16::from(product.discount.value()))
        .bind(stock_quantity)
        .bind(&product.unit)
        .bind(product.supplier_name.as_deref())
        .bind(&product.tags)
        .bind(product.featured)
        .bind(product.image_url.as_deref())
        .bind(product.rating)
        .bind(review_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
