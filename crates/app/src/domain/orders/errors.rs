//! Orders service errors.

use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    access::AccessDenied,
    domain::{
        inventory::models::ProductUuid,
        orders::models::{OrderStatus, StockShortage},
    },
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order already exists")]
    AlreadyExists,

    #[error("order not found")]
    NotFound,

    #[error("order has no lines")]
    EmptyOrder,

    #[error("quantity for product {0} must be at least one")]
    InvalidQuantity(ProductUuid),

    #[error("delivery address is required")]
    MissingAddress,

    #[error("product {0} does not exist")]
    UnknownProduct(ProductUuid),

    #[error("product {0} cannot be priced")]
    Unpriceable(ProductUuid),

    #[error("order total is too large")]
    TotalTooLarge,

    #[error("insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<StockShortage>),

    #[error("prices changed: quoted {quoted}, current {current}")]
    PriceChanged { quoted: Decimal, current: Decimal },

    #[error("order can no longer be cancelled")]
    NotCancellable,

    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for OrdersServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
