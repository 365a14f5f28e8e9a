//! Stored Rates Repository

use async_trait::async_trait;
use aurum::{
    metals::Metal,
    rates::{RateEntry, RateOrigin},
};
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{access::UserUuid, database::Db};

const LIST_STORED_RATES_SQL: &str = include_str!("sql/list_stored_rates.sql");
const UPSERT_STORED_RATE_SQL: &str = include_str!("sql/upsert_stored_rate.sql");

/// Operator-maintained rate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredRate {
    pub metal: Metal,
    pub price_per_gram: Decimal,
    pub updated_at: Timestamp,
    pub updated_by: Option<UserUuid>,
}

impl StoredRate {
    #[must_use]
    pub const fn entry(&self) -> RateEntry {
        RateEntry {
            metal: self.metal,
            price_per_gram: self.price_per_gram,
            origin: RateOrigin::Stored,
            fetched_at: self.updated_at,
        }
    }
}

#[automock]
#[async_trait]
pub trait RatesRepository: Send + Sync {
    /// Every stored rate, one per metal.
    async fn list_stored_rates(&self) -> Result<Vec<StoredRate>, sqlx::Error>;

    /// Insert or replace the stored rate for a metal.
    async fn upsert_stored_rate(
        &self,
        metal: Metal,
        price_per_gram: Decimal,
        updated_by: UserUuid,
    ) -> Result<StoredRate, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgRatesRepository {
    db: Db,
}

impl PgRatesRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RatesRepository for PgRatesRepository {
    async fn list_stored_rates(&self) -> Result<Vec<StoredRate>, sqlx::Error> {
        query_as::<Postgres, StoredRate>(LIST_STORED_RATES_SQL)
            .fetch_all(self.db.pool())
            .await
    }

    async fn upsert_stored_rate(
        &self,
        metal: Metal,
        price_per_gram: Decimal,
        updated_by: UserUuid,
    ) -> Result<StoredRate, sqlx::Error> {
        query_as::<Postgres, StoredRate>(UPSERT_STORED_RATE_SQL)
            .bind(metal.as_str())
            .bind(price_per_gram)
            .bind(updated_by.into_uuid())
            .fetch_one(self.db.pool())
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for StoredRate {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let metal: String = row.try_get("metal")?;

        let metal = metal
            .parse::<Metal>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "metal".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            metal,
            price_per_gram: row.try_get("price_per_gram")?,
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            updated_by: row
                .try_get::<Option<Uuid>, _>("updated_by")?
                .map(UserUuid::from_uuid),
        })
    }
}
