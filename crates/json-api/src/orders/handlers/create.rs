//! Checkout Handler

use std::sync::Arc;

use aurum_app::domain::orders::{
    OrdersServiceError,
    models::{NewOrder, OrderRequestLine, PaymentMethod, UnknownVariant},
};
use rust_decimal::Decimal;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    extensions::*,
    observability::observe_checkout,
    orders::{errors::into_status_error, payload::OrderResponse},
    state::State,
};

/// Requested Line
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutLine {
    /// Product id
    pub id: Uuid,
    pub quantity: u64,
}

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,

    /// Total shown to the customer; rejected when prices moved since
    #[serde(default)]
    #[salvo(schema(value_type = Option<f64>))]
    pub total: Option<Decimal>,

    pub address: String,

    /// `cod` or `online`
    pub payment_method: String,
}

impl TryFrom<CheckoutRequest> for NewOrder {
    type Error = StatusError;

    fn try_from(request: CheckoutRequest) -> Result<Self, Self::Error> {
        let payment_method: PaymentMethod = request
            .payment_method
            .parse()
            .map_err(|e: UnknownVariant| StatusError::bad_request().brief(e.to_string()))?;

        Ok(Self {
            lines: request
                .items
                .into_iter()
                .map(|line| OrderRequestLine {
                    product: line.id.into(),
                    quantity: line.quantity,
                })
                .collect(),
            quoted_total: request.total,
            address: request.address,
            payment_method,
        })
    }
}

const fn checkout_outcome(error: &OrdersServiceError) -> &'static str {
    match error {
        OrdersServiceError::InsufficientStock(_) => "insufficient_stock",
        OrdersServiceError::PriceChanged { .. } => "price_changed",
        OrdersServiceError::Sql(_) => "error",
        _ => "rejected",
    }
}

/// Checkout Handler
///
/// COD orders take their stock immediately; online orders take it when the
/// payment is verified.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid order"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock or prices changed"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        payment_method = tracing::field::Empty,
        lines = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = NewOrder::try_from(json.into_inner())?;
    let method = order.payment_method.as_str();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("payment_method", method);
    span.record("lines", order.lines.len());

    let placed = match state.app.orders.place_order(actor, order).await {
        Ok(placed) => placed,
        Err(error) => {
            observe_checkout(method, checkout_outcome(&error));

            return Err(into_status_error(error));
        }
    };

    observe_checkout(method, "placed");

    res.created_at(&format!("/orders/{}", placed.uuid))?;

    Ok(Json(placed.into()))
}

#[cfg(test)]
mod tests {
    use aurum_app::domain::{
        inventory::models::ProductUuid,
        orders::models::{OrderUuid, StockShortage},
    };
    use rust_decimal_macros::dec;
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        orders::payload::fixtures::{bangle_line, make_order},
        test_helpers::{AsActor, CUSTOMER, CUSTOMER_UUID, MockApp},
    };

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("orders").post(handler))
    }

    #[tokio::test]
    async fn test_cod_checkout_returns_confirmed_order() -> TestResult {
        let product = ProductUuid::new();
        let uuid = OrderUuid::new();

        let mut app = MockApp::default();

        app.orders
            .expect_place_order()
            .once()
            .withf(move |actor, order| {
                *actor == CUSTOMER
                    && *order
                        == NewOrder {
                            lines: vec![OrderRequestLine {
                                product,
                                quantity: 2,
                            }],
                            quoted_total: Some(dec!(21871.36)),
                            address: "12 Temple Road".to_string(),
                            payment_method: PaymentMethod::Cod,
                        }
            })
            .return_once(move |actor, _| {
                Ok(make_order(
                    uuid,
                    actor.user,
                    bangle_line(product, 2),
                    PaymentMethod::Cod,
                ))
            });

        let mut res = TestClient::post("http://example.com/orders")
            .as_actor(CUSTOMER)
            .json(&json!({
                "items": [{ "id": product.into_uuid(), "quantity": 2 }],
                "total": 21871.36,
                "address": "12 Temple Road",
                "paymentMethod": "cod",
            }))
            .send(&make_service(app))
            .await;

        let location = res
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/orders/{uuid}")));
        assert_eq!(body["userId"], json!(CUSTOMER_UUID.into_uuid()));
        assert_eq!(body["status"], json!("confirmed"));
        assert_eq!(body["paymentStatus"], json!("cod"));
        assert_eq!(body["total"], json!(21871.36));
        assert_eq!(body["items"][0]["lineTotal"], json!(21871.36));

        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_stock_returns_409() -> TestResult {
        let product = ProductUuid::new();

        let mut app = MockApp::default();

        app.orders
            .expect_place_order()
            .once()
            .return_once(move |_, _| {
                Err(OrdersServiceError::InsufficientStock(vec![StockShortage {
                    product,
                    requested: 1,
                    available: 0,
                }]))
            });

        let res = TestClient::post("http://example.com/orders")
            .as_actor(CUSTOMER)
            .json(&json!({
                "items": [{ "id": product.into_uuid(), "quantity": 1 }],
                "address": "12 Temple Road",
                "paymentMethod": "cod",
            }))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_payment_method_returns_400() -> TestResult {
        let mut app = MockApp::default();

        app.orders.expect_place_order().never();

        let res = TestClient::post("http://example.com/orders")
            .as_actor(CUSTOMER)
            .json(&json!({
                "items": [{ "id": ProductUuid::new().into_uuid(), "quantity": 1 }],
                "address": "12 Temple Road",
                "paymentMethod": "barter",
            }))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_empty_order_returns_400() -> TestResult {
        let mut app = MockApp::default();

        app.orders
            .expect_place_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::EmptyOrder));

        let res = TestClient::post("http://example.com/orders")
            .as_actor(CUSTOMER)
            .json(&json!({ "items": [], "address": "12 Temple Road", "paymentMethod": "online" }))
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[test]
    fn checkout_outcomes_are_labelled() {
        assert_eq!(
            checkout_outcome(&OrdersServiceError::InsufficientStock(Vec::new())),
            "insufficient_stock"
        );
        assert_eq!(
            checkout_outcome(&OrdersServiceError::PriceChanged {
                quoted: dec!(1),
                current: dec!(2),
            }),
            "price_changed"
        );
        assert_eq!(checkout_outcome(&OrdersServiceError::MissingAddress), "rejected");
    }
}
