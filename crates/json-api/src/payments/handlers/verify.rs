//! Verify Payment Handler

use std::sync::Arc;

use aurum_app::domain::payments::models::{StockAnomaly, Verification, VerifyPayment};
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::observe_verification,
    orders::payload::OrderResponse,
    payments::errors::into_status_error,
    state::State,
};

/// Gateway Callback
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyRequest {
    pub order_id: Uuid,
    pub external_order_id: String,
    pub external_payment_id: String,

    /// Hex HMAC-SHA256 of `external_order_id|external_payment_id`
    pub signature: String,
}

impl From<VerifyRequest> for VerifyPayment {
    fn from(request: VerifyRequest) -> Self {
        Self {
            order: request.order_id.into(),
            external_order_id: request.external_order_id,
            external_payment_id: request.external_payment_id,
            signature: request.signature,
        }
    }
}

/// Paid line queued for reconciliation instead of committed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnomalyResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub payment_id: Uuid,
    pub product_id: Uuid,

    /// `shortage`, `order_closed` or `duplicate_payment`
    pub reason: String,

    pub requested: u64,
    pub available: u64,

    /// RFC 3339 timestamp
    pub detected_at: String,
}

impl From<StockAnomaly> for AnomalyResponse {
    fn from(anomaly: StockAnomaly) -> Self {
        Self {
            id: anomaly.uuid.into(),
            order_id: anomaly.order.into(),
            payment_id: anomaly.payment.into(),
            product_id: anomaly.product.into(),
            reason: anomaly.reason.as_str().to_string(),
            requested: anomaly.requested,
            available: anomaly.available,
            detected_at: anomaly.detected_at.to_string(),
        }
    }
}

/// Verification Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyResponse {
    pub verified: bool,

    /// True when an earlier callback already captured this payment
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub already_captured: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderResponse>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<AnomalyResponse>,
}

/// Verify Payment Handler
///
/// A valid callback captures the payment and commits stock in one step. A
/// forged one answers 400 with `verified: false` and changes nothing but the
/// payment row.
#[endpoint(
    tags("payments"),
    summary = "Verify Payment",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment captured"),
        (status_code = StatusCode::BAD_REQUEST, description = "Signature did not match"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Online payments disabled"),
    ),
)]
#[tracing::instrument(
    name = "payments.verify",
    skip(json, depot, res),
    fields(order_uuid = tracing::field::Empty, verified = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<VerifyRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<VerifyResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("order_uuid", tracing::field::display(request.order_id));

    let verification = match state.app.payments.verify(actor, request.into()).await {
        Ok(verification) => verification,
        Err(error) => {
            observe_verification("error");

            return Err(into_status_error(error));
        }
    };

    span.record("verified", verification.is_verified());

    match verification {
        Verification::Verified {
            order,
            already_captured,
            anomalies,
        } => {
            observe_verification(if already_captured {
                "already_captured"
            } else {
                "verified"
            });

            Ok(Json(VerifyResponse {
                verified: true,
                already_captured,
                order: Some(order.into()),
                anomalies: anomalies.into_iter().map(Into::into).collect(),
            }))
        }
        Verification::Invalid => {
            observe_verification("invalid");

            res.status_code(StatusCode::BAD_REQUEST);

            Ok(Json(VerifyResponse {
                verified: false,
                already_captured: false,
                order: None,
                anomalies: Vec::new(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use aurum_app::domain::{
        inventory::models::ProductUuid,
        orders::models::{OrderStatus, OrderUuid, PaymentMethod, PaymentStatus},
        payments::{
            PaymentsServiceError,
            models::{AnomalyReason, PaymentUuid, StockAnomalyUuid},
        },
    };
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        orders::payload::fixtures::{bangle_line, make_order},
        test_helpers::{AsActor, CUSTOMER, CUSTOMER_UUID, MockApp},
    };

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("payments/verify").post(handler))
    }

    fn callback(order: OrderUuid) -> Value {
        json!({
            "orderId": order.into_uuid(),
            "externalOrderId": format!("order_{order}"),
            "externalPaymentId": "pay_1",
            "signature": "00ff",
        })
    }

    fn paid_order(order: OrderUuid, product: ProductUuid) -> aurum_app::domain::orders::models::Order {
        let mut paid = make_order(
            order,
            CUSTOMER_UUID,
            bangle_line(product, 1),
            PaymentMethod::Online,
        );

        paid.status = OrderStatus::Confirmed;
        paid.payment_status = PaymentStatus::Paid;
        paid.transaction_id = Some("pay_1".to_string());

        paid
    }

    #[tokio::test]
    async fn test_valid_callback_confirms_order() -> TestResult {
        let order = OrderUuid::new();
        let product = ProductUuid::new();

        let mut app = MockApp::default();

        app.payments
            .expect_verify()
            .once()
            .withf(move |actor, request| {
                *actor == CUSTOMER
                    && request.order == order
                    && request.external_payment_id == "pay_1"
                    && request.signature == "00ff"
            })
            .return_once(move |_, _| {
                Ok(Verification::Verified {
                    order: paid_order(order, product),
                    already_captured: false,
                    anomalies: Vec::new(),
                })
            });

        let mut res = TestClient::post("http://example.com/payments/verify")
            .as_actor(CUSTOMER)
            .json(&callback(order))
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["verified"], json!(true));
        assert_eq!(body["order"]["status"], json!("confirmed"));
        assert_eq!(body["order"]["paymentStatus"], json!("paid"));
        assert_eq!(body["order"]["transactionId"], json!("pay_1"));
        assert_eq!(body.get("alreadyCaptured"), None);

        Ok(())
    }

    #[tokio::test]
    async fn test_forged_callback_returns_400_unverified() -> TestResult {
        let order = OrderUuid::new();

        let mut app = MockApp::default();

        app.payments
            .expect_verify()
            .once()
            .return_once(|_, _| Ok(Verification::Invalid));

        let mut res = TestClient::post("http://example.com/payments/verify")
            .as_actor(CUSTOMER)
            .json(&callback(order))
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body, json!({ "verified": false }));

        Ok(())
    }

    #[tokio::test]
    async fn test_capture_without_stock_reports_anomaly() -> TestResult {
        let order = OrderUuid::new();
        let product = ProductUuid::new();

        let mut app = MockApp::default();

        app.payments.expect_verify().once().return_once(move |_, _| {
            let mut paid = paid_order(order, product);
            paid.needs_reconciliation = true;

            Ok(Verification::Verified {
                order: paid,
                already_captured: false,
                anomalies: vec![StockAnomaly {
                    uuid: StockAnomalyUuid::new(),
                    order,
                    payment: PaymentUuid::new(),
                    product,
                    reason: AnomalyReason::Shortage,
                    requested: 1,
                    available: 0,
                    detected_at: Timestamp::UNIX_EPOCH,
                }],
            })
        });

        let mut res = TestClient::post("http://example.com/payments/verify")
            .as_actor(CUSTOMER)
            .json(&callback(order))
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["verified"], json!(true));
        assert_eq!(body["order"]["needsReconciliation"], json!(true));
        assert_eq!(body["anomalies"][0]["productId"], json!(product.into_uuid()));
        assert_eq!(body["anomalies"][0]["available"], json!(0));
        assert_eq!(body["anomalies"][0]["reason"], json!("shortage"));

        Ok(())
    }

    #[tokio::test]
    async fn test_repeat_callback_is_flagged() -> TestResult {
        let order = OrderUuid::new();
        let product = ProductUuid::new();

        let mut app = MockApp::default();

        app.payments.expect_verify().once().return_once(move |_, _| {
            Ok(Verification::Verified {
                order: paid_order(order, product),
                already_captured: true,
                anomalies: Vec::new(),
            })
        });

        let mut res = TestClient::post("http://example.com/payments/verify")
            .as_actor(CUSTOMER)
            .json(&callback(order))
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["alreadyCaptured"], json!(true));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_payment_returns_404() -> TestResult {
        let mut app = MockApp::default();

        app.payments
            .expect_verify()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::NotFound));

        let res = TestClient::post("http://example.com/payments/verify")
            .as_actor(CUSTOMER)
            .json(&callback(OrderUuid::new()))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
