//! Inventory Listing Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    inventory::{errors::into_status_error, payload::ItemResponse},
    state::State,
};

/// Inventory Listing Handler
#[endpoint(
    tags("inventory"),
    summary = "List Inventory",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Every item, priced at the current rates"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<ItemResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let items = state
        .app
        .inventory
        .list_items()
        .await
        .map_err(into_status_error)?;

    Ok(Json(items.into_iter().map(Into::into).collect()))
}
