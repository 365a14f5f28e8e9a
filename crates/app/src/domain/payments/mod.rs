//! Payments

pub mod errors;
pub mod gateway;
pub mod models;
pub mod repository;
pub mod service;
pub mod signature;

pub use errors::{GatewayError, PaymentsServiceError};
pub use gateway::{HttpPaymentGateway, PaymentGateway, PaymentGatewayConfig};
pub use repository::{PaymentsRepository, PgPaymentsRepository};
pub use service::*;
