//! Stock Anomaly Queue Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::verify::AnomalyResponse},
    state::State,
};

/// Stock Anomaly Queue Handler
///
/// Paid lines whose stock was not committed, oldest first. Each names why:
/// stock ran out, the order was closed, or the order was already paid.
#[endpoint(
    tags("payments"),
    summary = "List Stock Anomalies",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Reconciliation queue"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller may not review anomalies"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<AnomalyResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let anomalies = state
        .app
        .payments
        .list_anomalies(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(anomalies.into_iter().map(Into::into).collect()))
}
