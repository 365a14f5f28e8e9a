//! Create Payment Handler

use std::sync::Arc;

use aurum_app::domain::payments::models::PaymentIntent;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, payments::errors::into_status_error, state::State};

/// Create Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePaymentRequest {
    pub order_id: Uuid,
}

/// Payment Created Response; what the client needs to open the gateway checkout
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentCreatedResponse {
    pub payment_id: Uuid,
    pub order_id: Uuid,
    pub external_order_id: String,

    /// Public gateway key
    pub key_id: String,

    /// Amount in the currency's minor unit
    pub amount: i64,

    pub currency: String,
}

impl From<PaymentIntent> for PaymentCreatedResponse {
    fn from(intent: PaymentIntent) -> Self {
        Self {
            payment_id: intent.payment.uuid.into(),
            order_id: intent.payment.order.into(),
            external_order_id: intent.payment.external_order_id,
            key_id: intent.key_id,
            amount: intent.amount_minor,
            currency: intent.payment.currency,
        }
    }
}

/// Create Payment Handler
#[endpoint(
    tags("payments"),
    summary = "Create Payment",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Gateway order registered"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order is not awaiting online payment"),
        (status_code = StatusCode::BAD_GATEWAY, description = "Gateway failed"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Online payments disabled"),
    ),
)]
#[tracing::instrument(
    name = "payments.create",
    skip(json, depot, res),
    fields(order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreatePaymentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<PaymentCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = json.into_inner().order_id;

    tracing::Span::current().record("order_uuid", tracing::field::display(order));

    let intent = state
        .app
        .payments
        .create_payment(actor, order.into())
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(intent.into()))
}
