//! Payments service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::access::AccessDenied;

/// Failures talking to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("payment gateway did not answer in time")]
    Timeout,

    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),

    #[error("payment gateway rejected the request with status {status}")]
    Rejected { status: u16, body: String },

    #[error("payment gateway returned malformed data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment gateway is not configured")]
    NotConfigured,

    #[error("payment not found")]
    NotFound,

    #[error("order is not awaiting online payment")]
    NotPayable,

    #[error("payment already exists")]
    AlreadyExists,

    #[error("related resource not found")]
    InvalidReference,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for PaymentsServiceError {
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
