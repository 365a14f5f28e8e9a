//! Inventory service errors.

use aurum::attributes::AttributeError;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::access::AccessDenied;

#[derive(Debug, Error)]
pub enum InventoryServiceError {
    #[error("inventory item already exists")]
    AlreadyExists,

    #[error("inventory item not found")]
    NotFound,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    InvalidAttributes(#[from] AttributeError),

    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for InventoryServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
