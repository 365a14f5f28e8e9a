//! Metal Rate Errors

use salvo::http::StatusError;
use tracing::error;

use aurum_app::domain::rates::RatesServiceError;

pub(crate) fn into_status_error(error: RatesServiceError) -> StatusError {
    match error {
        RatesServiceError::AccessDenied(denied) => StatusError::forbidden().brief(denied.to_string()),
        RatesServiceError::InvalidPrice(_) | RatesServiceError::InvalidData => {
            StatusError::bad_request().brief("Price per gram must be greater than zero")
        }
        RatesServiceError::InvalidReference => {
            StatusError::bad_request().brief("Invalid metal rate payload")
        }
        RatesServiceError::Sql(source) => {
            error!("failed to store metal rate: {source}");

            StatusError::internal_server_error()
        }
    }
}
