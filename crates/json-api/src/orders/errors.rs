//! Order Errors

use salvo::http::StatusError;
use tracing::error;

use aurum_app::domain::orders::{OrdersServiceError, models::StockShortage};

/// One clause per short line, e.g. `product <uuid>: requested 2, available 1`.
fn shortage_detail(shortages: &[StockShortage]) -> String {
    shortages
        .iter()
        .map(|s| {
            format!(
                "product {}: requested {}, available {}",
                s.product, s.requested, s.available
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::AlreadyExists => StatusError::conflict().brief("Order already exists"),
        OrdersServiceError::NotFound => StatusError::not_found(),
        OrdersServiceError::EmptyOrder
        | OrdersServiceError::InvalidQuantity(_)
        | OrdersServiceError::MissingAddress
        | OrdersServiceError::UnknownProduct(_)
        | OrdersServiceError::TotalTooLarge => {
            StatusError::bad_request().brief(error.to_string())
        }
        OrdersServiceError::InvalidReference | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order payload")
        }
        OrdersServiceError::InsufficientStock(shortages) => StatusError::conflict()
            .brief("Insufficient stock")
            .detail(shortage_detail(&shortages)),
        OrdersServiceError::PriceChanged { quoted, current } => StatusError::conflict()
            .brief("Prices changed since the order was quoted")
            .detail(format!("quoted {quoted}, current {current}")),
        OrdersServiceError::NotCancellable | OrdersServiceError::InvalidTransition { .. } => {
            StatusError::conflict().brief(error.to_string())
        }
        OrdersServiceError::AccessDenied(denied) => {
            StatusError::forbidden().brief(denied.to_string())
        }
        OrdersServiceError::Unpriceable(product) => {
            error!(%product, "stored item attributes cannot be priced");

            StatusError::internal_server_error()
        }
        OrdersServiceError::Sql(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}
