//! Advance Order Status Handler

use std::sync::Arc;

use aurum_app::domain::orders::models::{OrderStatus, UnknownVariant};
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
    orders::{errors::into_status_error, payload::OrderResponse},
    state::State,
};

/// Status Update Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct StatusUpdateRequest {
    /// `shipped`, `delivered` or `cancelled`
    pub status: String,
}

/// Advance Order Status Handler
#[endpoint(
    tags("orders"),
    summary = "Advance Order Status",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order moved"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown status"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not manage orders"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Transition not allowed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.status",
    skip(order, json, depot),
    fields(order_uuid = tracing::field::Empty, status = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<StatusUpdateRequest>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = order.into_inner();

    let next: OrderStatus = json
        .into_inner()
        .status
        .parse()
        .map_err(|e: UnknownVariant| StatusError::bad_request().brief(e.to_string()))?;

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(order));
    span.record("status", next.as_str());

    let moved = state
        .app
        .orders
        .advance_status(actor, order.into(), next)
        .await
        .map_err(into_status_error)?;

    Ok(Json(moved.into()))
}
