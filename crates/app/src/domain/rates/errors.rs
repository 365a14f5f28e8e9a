//! Rate errors.

use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::access::AccessDenied;

/// Why a spot feed fetch produced no usable quote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("spot feed did not answer in time")]
    Timeout,

    #[error("spot feed unavailable: {0}")]
    Unavailable(String),

    #[error("spot feed returned malformed data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum RatesServiceError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("price per gram must be positive, got {0}")]
    InvalidPrice(Decimal),

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for RatesServiceError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
