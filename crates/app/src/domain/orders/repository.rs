//! Orders Repository
//!
//! Stock only moves through [`commit_stock`]: a guarded one-shot mark on the
//! order followed by a conditional decrement per line.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction, query, query_as, query_scalar};

use crate::{
    access::UserUuid,
    database::Db,
    domain::{
        inventory::models::ProductUuid,
        orders::{
            models::{Order, OrderDraft, OrderLine, OrderStatus, OrderUuid, StockCommit, StockShortage},
            records::{OrderRecord, decode_error},
        },
    },
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_LINE_SQL: &str = include_str!("sql/insert_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("sql/get_order_lines.sql");
const DELETE_UNPAID_ORDER_SQL: &str = include_str!("sql/delete_unpaid_order.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("sql/update_order_status.sql");
const MARK_STOCK_COMMITTED_SQL: &str = include_str!("sql/mark_stock_committed.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const GET_STOCK_SQL: &str = include_str!("sql/get_stock.sql");

#[automock]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Store an order without touching stock.
    async fn insert_order(&self, draft: OrderDraft) -> Result<Order, sqlx::Error>;

    /// Store an order and commit its stock in one transaction. When any line
    /// is short nothing is stored.
    async fn insert_committed_order(&self, draft: OrderDraft) -> Result<StockCommit, sqlx::Error>;

    async fn get_order(&self, order: OrderUuid) -> Result<Order, sqlx::Error>;

    /// Delete an order owned by `user` that is pending and unsettled.
    /// Returns the number of rows removed.
    async fn delete_unpaid_order(&self, order: OrderUuid, user: UserUuid)
    -> Result<u64, sqlx::Error>;

    /// Move an order from `from` to `to`. Returns the number of rows changed.
    async fn update_status(
        &self,
        order: OrderUuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, sqlx::Error>;
}

/// Result of running the commit step for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    /// Stock for this order was committed earlier.
    AlreadyCommitted,

    /// Commit ran; lines whose decrement failed are listed.
    Ran(Vec<StockShortage>),
}

#[derive(Debug, Clone)]
pub struct PgOrdersRepository {
    db: Db,
}

impl PgOrdersRepository {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        draft: &OrderDraft,
    ) -> Result<(), sqlx::Error> {
        query(INSERT_ORDER_SQL)
            .bind(draft.uuid.into_uuid())
            .bind(draft.user.into_uuid())
            .bind(draft.total)
            .bind(&draft.address)
            .bind(draft.payment_method.as_str())
            .bind(draft.status.as_str())
            .bind(draft.payment_status.as_str())
            .execute(&mut **tx)
            .await?;

        for (position, line) in (0_i32..).zip(&draft.lines) {
            query(INSERT_ORDER_LINE_SQL)
                .bind(draft.uuid.into_uuid())
                .bind(position)
                .bind(line.product.into_uuid())
                .bind(quantity_to_i64(line.quantity)?)
                .bind(line.unit_price)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl OrdersRepository for PgOrdersRepository {
    async fn insert_order(&self, draft: OrderDraft) -> Result<Order, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        Self::insert(&mut tx, &draft).await?;
        let order = fetch_order(&mut tx, draft.uuid).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn insert_committed_order(&self, draft: OrderDraft) -> Result<StockCommit, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        Self::insert(&mut tx, &draft).await?;

        if let CommitOutcome::Ran(shortages) = commit_stock(&mut tx, draft.uuid, &draft.lines).await?
            && !shortages.is_empty()
        {
            tx.rollback().await?;

            return Ok(StockCommit::Short(shortages));
        }

        let order = fetch_order(&mut tx, draft.uuid).await?;

        tx.commit().await?;

        Ok(StockCommit::Committed(order))
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        let order = fetch_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn delete_unpaid_order(
        &self,
        order: OrderUuid,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_UNPAID_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(from.as_str())
            .bind(to.as_str())
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

/// Load an order with its lines.
pub(crate) async fn fetch_order(
    tx: &mut Transaction<'_, Postgres>,
    order: OrderUuid,
) -> Result<Order, sqlx::Error> {
    let record = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
        .bind(order.into_uuid())
        .fetch_one(&mut **tx)
        .await?;

    let lines = query_as::<Postgres, OrderLine>(GET_ORDER_LINES_SQL)
        .bind(order.into_uuid())
        .fetch_all(&mut **tx)
        .await?;

    Ok(record.with_lines(lines))
}

/// Commit stock for an order exactly once.
///
/// The order is marked committed only if it was not already; each line then
/// decrements `stock` only where enough remains. The caller decides whether
/// shortfalls roll the transaction back or are recorded.
pub(crate) async fn commit_stock(
    tx: &mut Transaction<'_, Postgres>,
    order: OrderUuid,
    lines: &[OrderLine],
) -> Result<CommitOutcome, sqlx::Error> {
    let marked = query(MARK_STOCK_COMMITTED_SQL)
        .bind(order.into_uuid())
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if marked == 0 {
        return Ok(CommitOutcome::AlreadyCommitted);
    }

    let mut shortages = Vec::new();

    for line in lines {
        let quantity = quantity_to_i64(line.quantity)?;

        let decremented = query(DECREMENT_STOCK_SQL)
            .bind(line.product.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if decremented == 0 {
            shortages.push(StockShortage {
                product: line.product,
                requested: line.quantity,
                available: current_stock(tx, line.product).await?,
            });
        }
    }

    Ok(CommitOutcome::Ran(shortages))
}

/// Stock on hand for a product; missing products read as zero.
pub(crate) async fn current_stock(
    tx: &mut Transaction<'_, Postgres>,
    product: ProductUuid,
) -> Result<u64, sqlx::Error> {
    let stock: Option<i64> = query_scalar(GET_STOCK_SQL)
        .bind(product.into_uuid())
        .fetch_optional(&mut **tx)
        .await?;

    u64::try_from(stock.unwrap_or_default()).map_err(|e| decode_error("stock", e))
}

fn quantity_to_i64(quantity: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(quantity).map_err(|e| decode_error("quantity", e))
}
