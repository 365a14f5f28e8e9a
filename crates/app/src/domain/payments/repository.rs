//! Payments Repository

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use mockall::automock;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::Db,
    domain::{
        inventory::models::ProductUuid,
        orders::{
            models::{OrderStatus, OrderUuid, PaymentStatus, StockShortage},
            records::decode_error,
            repository::{CommitOutcome, commit_stock, current_stock, fetch_order},
        },
        payments::models::{
            AnomalyReason, CaptureOutcome, CaptureStatus, NewPayment, Payment, PaymentUuid,
            StockAnomaly, StockAnomalyUuid,
        },
    },
};

const INSERT_PAYMENT_SQL: &str = include_str!("sql/insert_payment.sql");
const FIND_PAYMENT_BY_EXTERNAL_ORDER_SQL: &str =
    include_str!("sql/find_payment_by_external_order.sql");
const LOCK_PAYMENT_SQL: &str = include_str!("sql/lock_payment.sql");
const MARK_PAYMENT_FAILED_SQL: &str = include_str!("sql/mark_payment_failed.sql");
const MARK_PAYMENT_CAPTURED_SQL: &str = include_str!("sql/mark_payment_captured.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const MARK_ORDER_PAID_SQL: &str = include_str!("sql/mark_order_paid.sql");
const MARK_CLOSED_ORDER_PAID_SQL: &str = include_str!("sql/mark_closed_order_paid.sql");
const INSERT_STOCK_ANOMALY_SQL: &str = include_str!("sql/insert_stock_anomaly.sql");
const FLAG_RECONCILIATION_SQL: &str = include_str!("sql/flag_reconciliation.sql");
const LIST_ANOMALIES_SQL: &str = include_str!("sql/list_anomalies.sql");

#[automock]
#[async_trait]
pub trait PaymentsRepository: Send + Sync {
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, sqlx::Error>;

    async fn find_by_external_order(
        &self,
        external_order_id: String,
    ) -> Result<Option<Payment>, sqlx::Error>;

    /// Mark a payment failed unless it was already settled. Returns the
    /// number of rows changed.
    async fn mark_failed(
        &self,
        payment: PaymentUuid,
        external_payment_id: String,
        signature: String,
    ) -> Result<u64, sqlx::Error>;

    /// Capture a payment, mark its order paid and commit its stock, all in
    /// one transaction. Lines that cannot be decremented are queued as
    /// anomalies and the order is flagged for reconciliation.
    ///
    /// Only a pending order is confirmed. A payment for a cancelled order is
    /// recorded against it without reviving it, and a payment for an order
    /// that is already paid is kept as a duplicate; either way every line is
    /// queued and no stock moves.
    async fn capture(
        &self,
        payment: PaymentUuid,
        external_payment_id: String,
        signature: String,
    ) -> Result<CaptureOutcome, sqlx::Error>;

    async fn list_anomalies(&self) -> Result<Vec<StockAnomaly>, sqlx::Error>;
}

#[derive(Debug, Clone)]
pub struct PgPaymentsRepository {
    db: Db,
}

impl PgPaymentsRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentsRepository for PgPaymentsRepository {
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, sqlx::Error> {
        query_as::<Postgres, Payment>(INSERT_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.order.into_uuid())
            .bind(&payment.external_order_id)
            .bind(payment.amount)
            .bind(&payment.currency)
            .fetch_one(self.db.pool())
            .await
    }

    async fn find_by_external_order(
        &self,
        external_order_id: String,
    ) -> Result<Option<Payment>, sqlx::Error> {
        query_as::<Postgres, Payment>(FIND_PAYMENT_BY_EXTERNAL_ORDER_SQL)
            .bind(external_order_id)
            .fetch_optional(self.db.pool())
            .await
    }

    async fn mark_failed(
        &self,
        payment: PaymentUuid,
        external_payment_id: String,
        signature: String,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_PAYMENT_FAILED_SQL)
            .bind(payment.into_uuid())
            .bind(external_payment_id)
            .bind(signature)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn capture(
        &self,
        payment: PaymentUuid,
        external_payment_id: String,
        signature: String,
    ) -> Result<CaptureOutcome, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let locked = query_as::<Postgres, Payment>(LOCK_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        if locked.status.is_settled() {
            let order = fetch_order(&mut tx, locked.order).await?;

            tx.commit().await?;

            return Ok(CaptureOutcome::AlreadyCaptured { order });
        }

        let (status, payment_status): (String, String) = query_as(LOCK_ORDER_SQL)
            .bind(locked.order.into_uuid())
            .fetch_one(&mut *tx)
            .await?;

        let settlement = Settlement::for_order(
            status.parse().map_err(|e| decode_error("status", e))?,
            payment_status
                .parse()
                .map_err(|e| decode_error("payment_status", e))?,
        );

        let capture_status = match settlement {
            Settlement::Queue(AnomalyReason::DuplicatePayment) => CaptureStatus::Duplicate,
            Settlement::Commit | Settlement::Queue(_) => CaptureStatus::Captured,
        };

        query(MARK_PAYMENT_CAPTURED_SQL)
            .bind(payment.into_uuid())
            .bind(&external_payment_id)
            .bind(&signature)
            .bind(capture_status.as_str())
            .execute(&mut *tx)
            .await?;

        let lines = fetch_order(&mut tx, locked.order).await?.lines;

        let queued = match settlement {
            Settlement::Commit => {
                let paid = query(MARK_ORDER_PAID_SQL)
                    .bind(locked.order.into_uuid())
                    .bind(&external_payment_id)
                    .execute(&mut *tx)
                    .await?
                    .rows_affected();

                if paid == 0 {
                    return Err(sqlx::Error::RowNotFound);
                }

                match commit_stock(&mut tx, locked.order, &lines).await? {
                    CommitOutcome::Ran(shortages) => shortages
                        .into_iter()
                        .map(|shortage| (shortage, AnomalyReason::Shortage))
                        .collect(),
                    CommitOutcome::AlreadyCommitted => Vec::new(),
                }
            }
            Settlement::Queue(reason) => {
                if reason == AnomalyReason::OrderClosed {
                    query(MARK_CLOSED_ORDER_PAID_SQL)
                        .bind(locked.order.into_uuid())
                        .bind(&external_payment_id)
                        .execute(&mut *tx)
                        .await?;
                }

                let mut queued = Vec::with_capacity(lines.len());

                for line in &lines {
                    let available = current_stock(&mut tx, line.product).await?;

                    queued.push((
                        StockShortage {
                            product: line.product,
                            requested: line.quantity,
                            available,
                        },
                        reason,
                    ));
                }

                queued
            }
        };

        let mut anomalies = Vec::with_capacity(queued.len());

        for (shortage, reason) in queued {
            anomalies.push(queue_anomaly(&mut tx, &locked, shortage, reason).await?);
        }

        if !anomalies.is_empty() {
            query(FLAG_RECONCILIATION_SQL)
                .bind(locked.order.into_uuid())
                .execute(&mut *tx)
                .await?;
        }

        let order = fetch_order(&mut tx, locked.order).await?;

        tx.commit().await?;

        Ok(CaptureOutcome::Captured { order, anomalies })
    }

    async fn list_anomalies(&self) -> Result<Vec<StockAnomaly>, sqlx::Error> {
        query_as::<Postgres, StockAnomaly>(LIST_ANOMALIES_SQL)
            .fetch_all(self.db.pool())
            .await
    }
}

/// What a verified payment may do to its order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    /// Confirm the order and commit its stock.
    Commit,

    /// Leave the order and stock alone; queue every line for a person.
    Queue(AnomalyReason),
}

impl Settlement {
    fn for_order(status: OrderStatus, payment_status: PaymentStatus) -> Self {
        if status == OrderStatus::Pending && payment_status.is_unsettled() {
            Self::Commit
        } else if payment_status == PaymentStatus::Paid {
            Self::Queue(AnomalyReason::DuplicatePayment)
        } else {
            Self::Queue(AnomalyReason::OrderClosed)
        }
    }
}

async fn queue_anomaly(
    tx: &mut Transaction<'_, Postgres>,
    payment: &Payment,
    shortage: StockShortage,
    reason: AnomalyReason,
) -> Result<StockAnomaly, sqlx::Error> {
    let uuid = StockAnomalyUuid::new();

    let (detected_at,): (SqlxTimestamp,) = query_as(INSERT_STOCK_ANOMALY_SQL)
        .bind(uuid.into_uuid())
        .bind(payment.order.into_uuid())
        .bind(payment.uuid.into_uuid())
        .bind(shortage.product.into_uuid())
        .bind(reason.as_str())
        .bind(count_to_i64(shortage.requested)?)
        .bind(count_to_i64(shortage.available)?)
        .fetch_one(&mut **tx)
        .await?;

    Ok(StockAnomaly {
        uuid,
        order: payment.order,
        payment: payment.uuid,
        product: shortage.product,
        reason,
        requested: shortage.requested,
        available: shortage.available,
        detected_at: detected_at.to_jiff(),
    })
}

fn count_to_i64(count: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(count).map_err(|e| decode_error("quantity", e))
}

fn count_from_row(row: &PgRow, column: &str) -> sqlx::Result<u64> {
    let count: i64 = row.try_get(column)?;

    u64::try_from(count).map_err(|e| decode_error(column, e))
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;

        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            external_order_id: row.try_get("external_order_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            status: status.parse().map_err(|e| decode_error("status", e))?,
            external_payment_id: row.try_get("external_payment_id")?,
            external_signature: row.try_get("external_signature")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for StockAnomaly {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let reason: String = row.try_get("reason")?;

        Ok(Self {
            uuid: StockAnomalyUuid::from_uuid(row.try_get("uuid")?),
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            payment: PaymentUuid::from_uuid(row.try_get("payment_uuid")?),
            product: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            reason: reason.parse().map_err(|e| decode_error("reason", e))?,
            requested: count_from_row(row, "requested")?,
            available: count_from_row(row, "available")?,
            detected_at: row.try_get::<SqlxTimestamp, _>("detected_at")?.to_jiff(),
        })
    }
}
