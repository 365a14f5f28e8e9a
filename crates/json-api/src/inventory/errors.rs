//! Inventory Errors

use salvo::http::StatusError;
use tracing::error;

use aurum_app::domain::inventory::InventoryServiceError;

pub(crate) fn into_status_error(error: InventoryServiceError) -> StatusError {
    match error {
        InventoryServiceError::AlreadyExists => {
            StatusError::conflict().brief("Inventory item already exists")
        }
        InventoryServiceError::NotFound => StatusError::not_found(),
        InventoryServiceError::MissingRequiredData | InventoryServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid inventory payload")
        }
        InventoryServiceError::InvalidAttributes(invalid) => {
            StatusError::bad_request().brief(invalid.to_string())
        }
        InventoryServiceError::AccessDenied(denied) => {
            StatusError::forbidden().brief(denied.to_string())
        }
        InventoryServiceError::Sql(source) => {
            error!("inventory storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
