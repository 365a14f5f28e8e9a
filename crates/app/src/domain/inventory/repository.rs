//! Inventory Repository

use async_trait::async_trait;
use aurum::attributes::{ItemAttributes, ItemType};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    access::UserUuid,
    database::Db,
    domain::inventory::models::{
        InventoryItem, InventoryItemUpdate, NewInventoryItem, ProductUuid,
    },
};

const LIST_ITEMS_SQL: &str = include_str!("sql/list_items.sql");
const GET_ITEM_SQL: &str = include_str!("sql/get_item.sql");
const GET_ITEMS_SQL: &str = include_str!("sql/get_items.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const CREATE_ITEM_SQL: &str = include_str!("sql/create_item.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const UPDATE_ITEM_SQL: &str = include_str!("sql/update_item.sql");

#[automock]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, sqlx::Error>;

    async fn get_item(&self, product: ProductUuid) -> Result<InventoryItem, sqlx::Error>;

    /// Items for the given products; unknown products are skipped.
    async fn get_items(&self, products: Vec<ProductUuid>)
    -> Result<Vec<InventoryItem>, sqlx::Error>;

    async fn create_item(
        &self,
        item: NewInventoryItem,
        created_by: UserUuid,
    ) -> Result<InventoryItem, sqlx::Error>;

    async fn update_item(
        &self,
        product: ProductUuid,
        update: InventoryItemUpdate,
    ) -> Result<InventoryItem, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgInventoryRepository {
    db: Db,
}

impl PgInventoryRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn fetch_item(
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<InventoryItem, sqlx::Error> {
        query_as::<Postgres, InventoryItem>(GET_ITEM_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, sqlx::Error> {
        query_as::<Postgres, InventoryItem>(LIST_ITEMS_SQL)
            .fetch_all(self.db.pool())
            .await
    }

    async fn get_item(&self, product: ProductUuid) -> Result<InventoryItem, sqlx::Error> {
        query_as::<Postgres, InventoryItem>(GET_ITEM_SQL)
            .bind(product.into_uuid())
            .fetch_one(self.db.pool())
            .await
    }

    async fn get_items(
        &self,
        products: Vec<ProductUuid>,
    ) -> Result<Vec<InventoryItem>, sqlx::Error> {
        let uuids: Vec<Uuid> = products.into_iter().map(ProductUuid::into_uuid).collect();

        query_as::<Postgres, InventoryItem>(GET_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(self.db.pool())
            .await
    }

    async fn create_item(
        &self,
        item: NewInventoryItem,
        created_by: UserUuid,
    ) -> Result<InventoryItem, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let stock = stock_to_i64(item.stock)?;

        let (created_at,): (SqlxTimestamp,) = query_as(CREATE_PRODUCT_SQL)
            .bind(item.uuid.into_uuid())
            .bind(&item.name)
            .bind(created_by.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let attributes = &item.attributes;

        query(CREATE_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(item.extra_description.as_deref())
            .bind(attributes.metal.as_str())
            .bind(attributes.hallmarked)
            .bind(attributes.purity)
            .bind(attributes.net_weight)
            .bind(attributes.extra_weight)
            .bind(attributes.extra_value)
            .bind(attributes.gross_weight)
            .bind(attributes.item_type.as_str())
            .bind(attributes.wastage_percent)
            .bind(attributes.making_charge_per_gram)
            .bind(attributes.stored_metal_price)
            .bind(stock)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;

        let created = Self::fetch_item(&mut tx, item.uuid).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_item(
        &self,
        product: ProductUuid,
        update: InventoryItemUpdate,
    ) -> Result<InventoryItem, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let stock = stock_to_i64(update.stock)?;

        let rows_affected = query(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(&update.name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let attributes = &update.attributes;

        query(UPDATE_ITEM_SQL)
            .bind(product.into_uuid())
            .bind(update.extra_description.as_deref())
            .bind(attributes.metal.as_str())
            .bind(attributes.hallmarked)
            .bind(attributes.purity)
            .bind(attributes.net_weight)
            .bind(attributes.extra_weight)
            .bind(attributes.extra_value)
            .bind(attributes.gross_weight)
            .bind(attributes.item_type.as_str())
            .bind(attributes.wastage_percent)
            .bind(attributes.making_charge_per_gram)
            .bind(attributes.stored_metal_price)
            .bind(stock)
            .execute(&mut *tx)
            .await?;

        let updated = Self::fetch_item(&mut tx, product).await?;

        tx.commit().await?;

        Ok(updated)
    }
}

fn stock_to_i64(stock: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
        index: "stock".to_string(),
        source: Box::new(e),
    })
}

fn decode_error(
    index: &str,
    error: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(error),
    }
}

impl<'r> FromRow<'r, PgRow> for InventoryItem {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let metal: String = row.try_get("metal")?;
        let item_type: String = row.try_get("item_type")?;
        let stock: i64 = row.try_get("stock")?;

        let attributes = ItemAttributes {
            metal: metal.parse().map_err(|e| decode_error("metal", e))?,
            hallmarked: row.try_get("hallmarked")?,
            purity: row.try_get("purity")?,
            net_weight: row.try_get("net_weight")?,
            extra_weight: row.try_get("extra_weight")?,
            extra_value: row.try_get("extra_value")?,
            gross_weight: row.try_get("gross_weight")?,
            item_type: item_type
                .parse::<ItemType>()
                .map_err(|e| decode_error("item_type", e))?,
            wastage_percent: row.try_get("wastage_percent")?,
            making_charge_per_gram: row.try_get("making_charge_per_gram")?,
            stored_metal_price: row.try_get("stored_metal_price")?,
        };

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            extra_description: row.try_get("extra_description")?,
            attributes,
            stock: u64::try_from(stock).map_err(|e| decode_error("stock", e))?,
            created_by: UserUuid::from_uuid(row.try_get("created_by")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
