//! Create Inventory Item Handler

use std::sync::Arc;

use aurum_app::domain::inventory::models::{NewInventoryItem, ProductUuid};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
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

/// Create Inventory Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateItemRequest {
    /// Client-chosen id; generated when absent
    #[serde(default)]
    pub uuid: Option<Uuid>,

    pub name: String,

    #[serde(default)]
    pub extra_description: Option<String>,

    pub attributes: AttributesPayload,

    pub stock: u64,
}

impl TryFrom<CreateItemRequest> for NewInventoryItem {
    type Error = StatusError;

    fn try_from(request: CreateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            uuid: request.uuid.map_or_else(ProductUuid::new, ProductUuid::from_uuid),
            name: request.name,
            extra_description: request.extra_description,
            attributes: request.attributes.try_into()?,
            stock: request.stock,
        })
    }
}

/// Create Inventory Item Handler
#[endpoint(
    tags("inventory"),
    summary = "Create Inventory Item",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Item created"),
        (status_code = StatusCode::CONFLICT, description = "Item already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid attributes"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not manage inventory"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "inventory.create",
    skip(json, depot, res),
    fields(user_uuid = tracing::field::Empty, product_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ItemResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let item = NewInventoryItem::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("product_uuid", tracing::field::display(item.uuid));

    let created = state
        .app
        .inventory
        .create_item(actor, item)
        .await
        .map_err(into_status_error)?;

    res.created_at(&format!("/inventory/{}", created.item.uuid))?;

    Ok(Json(created.into()))
}
