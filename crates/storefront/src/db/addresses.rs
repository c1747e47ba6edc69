//! `PostgreSQL` delivery address store.

use async_trait::async_trait;
use sqlx::PgPool;

use souk_core::{DeliveryAddress, Governorate, PostalCode, UserId};

use super::{AddressStore, RepositoryError};

#[derive(Debug, sqlx::FromRow)]
struct DeliveryAddressRow {
    street: String,
    address2: String,
    city: String,
    region: String,
    postal_code: String,
    country: String,
    instructions: Option<String>,
}

impl TryFrom<DeliveryAddressRow> for DeliveryAddress {
    type Error = RepositoryError;

    fn try_from(row: DeliveryAddressRow) -> Result<Self, Self::Error> {
        let region = row.region.parse::<Governorate>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid region in database: {e}"))
        })?;
        let postal_code = PostalCode::parse(&row.postal_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid postal code in database: {e}"))
        })?;

        Ok(Self {
            street: row.street,
            address2: row.address2,
            city: row.city,
            region,
            postal_code,
            country: row.country,
            instructions: row.instructions,
        })
    }
}

/// Address store backed by `storefront.delivery_address`.
#[derive(Clone)]
pub struct PgAddressStore {
    pool: PgPool,
}

impl PgAddressStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AddressStore for PgAddressStore {
    async fn save(
        &self,
        user_id: UserId,
        address: &DeliveryAddress,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO storefront.delivery_address
                (user_id, street, address2, city, region, postal_code, country, instructions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO UPDATE SET
                street = EXCLUDED.street,
                address2 = EXCLUDED.address2,
                city = EXCLUDED.city,
                region = EXCLUDED.region,
                postal_code = EXCLUDED.postal_code,
                country = EXCLUDED.country,
                instructions = EXCLUDED.instructions,
                updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(&address.street)
        .bind(&address.address2)
        .bind(&address.city)
        .bind(address.region.name())
        .bind(address.postal_code.as_str())
        .bind(&address.country)
        .bind(address.instructions.as_deref())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The user row is gone (account deleted mid-session).
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(RepositoryError::NotFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find(&self, user_id: UserId) -> Result<Option<DeliveryAddress>, RepositoryError> {
        let row: Option<DeliveryAddressRow> = sqlx::query_as(
            r"
            SELECT street, address2, city, region, postal_code, country, instructions
            FROM storefront.delivery_address
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DeliveryAddress::try_from).transpose()
    }
}
