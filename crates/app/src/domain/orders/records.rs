//! Order Records

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    access::UserUuid,
    domain::{
        inventory::models::ProductUuid,
        orders::models::{Order, OrderLine, OrderUuid, PaymentMethod, OrderStatus, PaymentStatus},
    },
};

/// An `orders` row, before its lines are attached.
#[derive(Debug, Clone)]
pub(crate) struct OrderRecord {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub total: Decimal,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub stock_committed_at: Option<jiff::Timestamp>,
    pub needs_reconciliation: bool,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl OrderRecord {
    pub(crate) fn with_lines(self, lines: Vec<OrderLine>) -> Order {
        Order {
            uuid: self.uuid,
            user: self.user,
            lines,
            total: self.total,
            address: self.address,
            payment_method: self.payment_method,
            status: self.status,
            payment_status: self.payment_status,
            transaction_id: self.transaction_id,
            stock_committed_at: self.stock_committed_at,
            needs_reconciliation: self.needs_reconciliation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub(crate) fn decode_error(
    index: &str,
    error: impl std::error::Error + Send + Sync + 'static,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: index.to_string(),
        source: Box::new(error),
    }
}

fn label<T>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;

    raw.parse().map_err(|e| decode_error(column, e))
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            total: row.try_get("total")?,
            address: row.try_get("address")?,
            payment_method: label(row, "payment_method")?,
            status: label(row, "status")?,
            payment_status: label(row, "payment_status")?,
            transaction_id: row.try_get("transaction_id")?,
            stock_committed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("stock_committed_at")?
                .map(SqlxTimestamp::to_jiff),
            needs_reconciliation: row.try_get("needs_reconciliation")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i64 = row.try_get("quantity")?;

        Ok(Self {
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            quantity: u64::try_from(quantity).map_err(|e| decode_error("quantity", e))?,
            unit_price: row.try_get("unit_price")?,
        })
    }
}
