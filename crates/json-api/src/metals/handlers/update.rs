//! Update Stored Metal Rate Handler

use std::sync::Arc;

use aurum::metals::Metal;
use aurum_app::domain::rates::StoredRate;
use rust_decimal::Decimal;
use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, metals::errors::into_status_error, state::State};

/// Update Metal Rate Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateMetalRateRequest {
    /// Price of one gram of the pure metal
    #[salvo(schema(value_type = f64))]
    pub price_per_gram: Decimal,
}

/// Stored Metal Rate Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRateResponse {
    pub metal: String,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub price_per_gram: Decimal,

    /// RFC 3339 timestamp
    pub updated_at: String,

    pub updated_by: Option<Uuid>,
}

impl From<StoredRate> for StoredRateResponse {
    fn from(rate: StoredRate) -> Self {
        Self {
            metal: rate.metal.as_str().to_string(),
            price_per_gram: rate.price_per_gram,
            updated_at: rate.updated_at.to_string(),
            updated_by: rate.updated_by.map(Into::into),
        }
    }
}

/// Update Stored Metal Rate Handler
///
/// Writes the operator-maintained fallback rate. Live prices still win while
/// they are fresh.
#[endpoint(
    tags("metals"),
    summary = "Update Stored Metal Rate",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Rate stored"),
        (status_code = StatusCode::BAD_REQUEST, description = "Unknown metal or non-positive price"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not manage rates"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "metals.update",
    skip(metal, json, depot),
    fields(metal = tracing::field::Empty, user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    metal: PathParam<String>,
    json: JsonBody<UpdateMetalRateRequest>,
    depot: &mut Depot,
) -> Result<Json<StoredRateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let metal: Metal = metal
        .into_inner()
        .parse()
        .map_err(|e: aurum::metals::UnknownMetal| StatusError::bad_request().brief(e.to_string()))?;

    let span = tracing::Span::current();

    span.record("metal", tracing::field::display(metal));
    span.record("user_uuid", tracing::field::display(actor.user));

    let stored = state
        .app
        .rates
        .set_stored_rate(actor, metal, json.into_inner().price_per_gram)
        .await
        .map_err(into_status_error)?;

    Ok(Json(stored.into()))
}
