//! Get Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, payload::OrderResponse},
    state::State,
};

/// Get Order Handler
///
/// Only the customer who placed an order can read it.
#[endpoint(
    tags("orders"),
    summary = "Get Order",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let order = state
        .app
        .orders
        .get_order(actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use aurum_app::domain::{
        inventory::models::ProductUuid,
        orders::{
            OrdersServiceError,
            models::{OrderUuid, PaymentMethod},
        },
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use crate::{
        orders::payload::fixtures::{bangle_line, make_order},
        test_helpers::{AsActor, CUSTOMER, MockApp},
    };

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("orders/{order}").get(handler))
    }

    #[tokio::test]
    async fn test_owner_reads_order() -> TestResult {
        let uuid = OrderUuid::new();

        let mut app = MockApp::default();

        app.orders
            .expect_get_order()
            .once()
            .withf(move |actor, order| *actor == CUSTOMER && *order == uuid)
            .return_once(|actor, order| {
                Ok(make_order(
                    order,
                    actor.user,
                    bangle_line(ProductUuid::new(), 1),
                    PaymentMethod::Online,
                ))
            });

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["id"], json!(uuid.into_uuid()));
        assert_eq!(body["status"], json!("pending"));
        assert_eq!(body["paymentStatus"], json!("pending"));
        assert_eq!(body["transactionId"], Value::Null);

        Ok(())
    }

    #[tokio::test]
    async fn test_foreign_order_returns_404() -> TestResult {
        let mut app = MockApp::default();

        app.orders
            .expect_get_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotFound));

        let res = TestClient::get(format!("http://example.com/orders/{}", OrderUuid::new()))
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }
}
