//! Update Inventory Item Handler

use std::sync::Arc;

use aurum_app::domain::inventory::models::InventoryItemUpdate;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    inventory::{
        errors::into_status_error,
        payload::{AttributesPayload, ItemResponse},
    },
    state::State,
};

/// Update Inventory Item Request; replaces every editable field
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateItemRequest {
    pub name: String,

    #[serde(default)]
    pub extra_description: Option<String>,

    pub attributes: AttributesPayload,

    pub stock: u64,
}

impl TryFrom<UpdateItemRequest> for InventoryItemUpdate {
    type Error = StatusError;

    fn try_from(request: UpdateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            extra_description: request.extra_description,
            attributes: request.attributes.try_into()?,
            stock: request.stock,
        })
    }
}

/// Update Inventory Item Handler
#[endpoint(
    tags("inventory"),
    summary = "Update Inventory Item",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Item not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid attributes"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not manage inventory"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "inventory.update",
    skip(product, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        product_uuid = tracing::field::Empty,
        stock = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    product: PathParam<Uuid>,
    json: JsonBody<UpdateItemRequest>,
    depot: &mut Depot,
) -> Result<Json<ItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let product = product.into_inner();
    let update = InventoryItemUpdate::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("product_uuid", tracing::field::display(product));
    span.record("stock", update.stock);

    let updated = state
        .app
        .inventory
        .update_item(actor, product.into(), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
