//! Get Inventory Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    inventory::{errors::into_status_error, payload::ItemResponse},
    state::State,
};

/// Get Inventory Item Handler
///
/// The price is recomputed at the current rates on every read.
#[endpoint(
    tags("inventory"),
    summary = "Get Inventory Item",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item with current valuation"),
        (status_code = StatusCode::NOT_FOUND, description = "Item not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<ItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let item = state
        .app
        .inventory
        .get_item(product.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(item.into()))
}
