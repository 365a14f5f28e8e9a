//! Payment Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use aurum_app::domain::payments::PaymentsServiceError;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotConfigured => {
            StatusError::service_unavailable().brief("Online payments are not available")
        }
        PaymentsServiceError::NotFound => StatusError::not_found(),
        PaymentsServiceError::NotPayable => {
            StatusError::conflict().brief("Order is not awaiting online payment")
        }
        PaymentsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Payment already exists for this order")
        }
        PaymentsServiceError::InvalidReference | PaymentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid payment payload")
        }
        PaymentsServiceError::Gateway(source) => {
            warn!("payment gateway failed: {source}");

            StatusError::bad_gateway().brief("Payment gateway unavailable, retry shortly")
        }
        PaymentsServiceError::AccessDenied(denied) => {
            StatusError::forbidden().brief(denied.to_string())
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
