//! Price Calculator Handler

use std::sync::Arc;

use aurum::pricing::PriceInputs;
use aurum_app::domain::inventory::QuoteRequest;
use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{extensions::*, inventory::errors::into_status_error, state::State};

/// Price Calculation Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateRequest {
    /// Per-gram price of the pure metal
    #[salvo(schema(value_type = f64))]
    pub metal_price: Decimal,

    pub hallmarked: bool,

    #[salvo(schema(value_type = f64))]
    pub purity: Decimal,

    #[salvo(schema(value_type = f64))]
    pub net_weight: Decimal,

    #[serde(default)]
    #[salvo(schema(value_type = f64))]
    pub extra_value: Decimal,

    #[salvo(schema(value_type = f64))]
    pub wastage_percent: Decimal,

    #[salvo(schema(value_type = f64))]
    pub making_charge_per_gram: Decimal,
}

impl From<CalculateRequest> for QuoteRequest {
    fn from(request: CalculateRequest) -> Self {
        Self {
            metal_price: request.metal_price,
            hallmarked: request.hallmarked,
            inputs: PriceInputs {
                purity: request.purity,
                net_weight: request.net_weight,
                wastage_percent: request.wastage_percent,
                making_charge_per_gram: request.making_charge_per_gram,
                extra_value: request.extra_value,
            },
        }
    }
}

/// Price Calculation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CalculateResponse {
    pub success: bool,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub metal_value: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub wastage_amount: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total_making_charge: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total_price: Decimal,
}

/// Price Calculator Handler
///
/// Prices arbitrary attributes at a caller-supplied rate without touching the
/// rate table.
#[endpoint(
    tags("inventory"),
    summary = "Calculate Price",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Price breakdown"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid numeric input"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CalculateRequest>,
    depot: &mut Depot,
) -> Result<Json<CalculateResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let breakdown = state
        .app
        .inventory
        .quote(json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(CalculateResponse {
        success: true,
        metal_value: breakdown.metal_value,
        wastage_amount: breakdown.wastage_amount,
        total_making_charge: breakdown.making_charge,
        total_price: breakdown.total_price,
    }))
}

#[cfg(test)]
mod tests {
    use aurum::{attributes::AttributeError, pricing::compute_price};
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::test_helpers::{AsActor, CUSTOMER, MockApp};

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("inventory/calculate").post(handler))
    }

    fn reference_inputs() -> PriceInputs {
        PriceInputs {
            purity: dec!(91.6),
            net_weight: dec!(10),
            wastage_percent: dec!(8),
            making_charge_per_gram: dec!(500),
            extra_value: dec!(0),
        }
    }

    #[tokio::test]
    async fn test_calculate_returns_breakdown() -> TestResult {
        let mut app = MockApp::default();

        app.inventory
            .expect_quote()
            .once()
            .withf(|request| {
                *request
                    == QuoteRequest {
                        metal_price: dec!(600),
                        hallmarked: true,
                        inputs: reference_inputs(),
                    }
            })
            .return_once(|request| Ok(compute_price(request.metal_price, &request.inputs)?.rounded()));

        let mut res = TestClient::post("http://example.com/inventory/calculate")
            .as_actor(CUSTOMER)
            .json(&json!({
                "metalPrice": 600,
                "hallmarked": true,
                "purity": 91.6,
                "netWeight": 10,
                "extraValue": 0,
                "wastagePercent": 8,
                "makingChargePerGram": 500,
            }))
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "success": true,
                "metalValue": 5496.0,
                "wastageAmount": 439.68,
                "totalMakingCharge": 5000.0,
                "totalPrice": 10935.68,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_negative_weight_returns_400() -> TestResult {
        let mut app = MockApp::default();

        app.inventory
            .expect_quote()
            .once()
            .return_once(|_| Err(AttributeError::Negative("netWeight").into()));

        let res = TestClient::post("http://example.com/inventory/calculate")
            .as_actor(CUSTOMER)
            .json(&json!({
                "metalPrice": 600,
                "hallmarked": true,
                "purity": 91.6,
                "netWeight": -1,
                "wastagePercent": 8,
                "makingChargePerGram": 500,
            }))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_field_never_reaches_service() -> TestResult {
        let mut app = MockApp::default();

        app.inventory.expect_quote().never();

        let res = TestClient::post("http://example.com/inventory/calculate")
            .as_actor(CUSTOMER)
            .json(&json!({ "metalPrice": 600, "hallmarked": true }))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}
