//! Order payloads.

use aurum_app::domain::orders::models::{Order, OrderLine};
use rust_decimal::Decimal;
use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order Line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderLineResponse {
    pub product_id: Uuid,
    pub quantity: u64,

    /// Unit price frozen at checkout
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub unit_price: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub line_total: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product.into(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        }
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderLineResponse>,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total: Decimal,

    pub address: String,

    /// `cod` or `online`
    pub payment_method: String,

    /// `pending`, `confirmed`, `shipped`, `delivered` or `cancelled`
    pub status: String,

    /// `pending`, `cod`, `paid` or `failed`
    pub payment_status: String,

    pub transaction_id: Option<String>,

    /// Set when a paid line could not be taken from stock
    pub needs_reconciliation: bool,

    /// RFC 3339 timestamp
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.uuid.into(),
            user_id: order.user.into(),
            items: order.lines.into_iter().map(Into::into).collect(),
            total: order.total,
            address: order.address,
            payment_method: order.payment_method.as_str().to_string(),
            status: order.status.as_str().to_string(),
            payment_status: order.payment_status.as_str().to_string(),
            transaction_id: order.transaction_id,
            needs_reconciliation: order.needs_reconciliation,
            created_at: order.created_at.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use aurum_app::{
        access::UserUuid,
        domain::{
            inventory::models::ProductUuid,
            orders::models::{OrderStatus, OrderUuid, PaymentMethod, PaymentStatus},
        },
    };
    use jiff::Timestamp;

    use super::*;

    pub(crate) fn make_order(
        uuid: OrderUuid,
        user: UserUuid,
        line: OrderLine,
        payment_method: PaymentMethod,
    ) -> Order {
        let (status, payment_status) = match payment_method {
            PaymentMethod::Cod => (OrderStatus::Confirmed, PaymentStatus::Cod),
            PaymentMethod::Online => (OrderStatus::Pending, PaymentStatus::Pending),
        };

        Order {
            uuid,
            user,
            lines: vec![line],
            total: line.line_total(),
            address: "12 Temple Road".to_string(),
            payment_method,
            status,
            payment_status,
            transaction_id: None,
            stock_committed_at: None,
            needs_reconciliation: false,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    pub(crate) fn bangle_line(product: ProductUuid, quantity: u64) -> OrderLine {
        OrderLine {
            product,
            quantity,
            unit_price: rust_decimal_macros::dec!(10935.68),
        }
    }
}
