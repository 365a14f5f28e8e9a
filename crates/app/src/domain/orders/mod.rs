//! Orders

pub mod errors;
pub mod models;
pub(crate) mod records;
pub mod repository;
pub mod service;

pub use errors::OrdersServiceError;
pub use repository::{OrdersRepository, PgOrdersRepository};
pub use service::*;
