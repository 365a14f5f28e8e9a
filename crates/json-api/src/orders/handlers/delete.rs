//! Cancel Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Cancel Order Handler
///
/// Removes the caller's own order while it is pending and nothing has been
/// collected for it.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    security(("identity" = [])),
    responses(
        (status_code = StatusCode::NO_CONTENT, description = "Order cancelled"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Order can no longer be cancelled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    state
        .app
        .orders
        .cancel_order(actor, order.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use aurum_app::domain::orders::{OrdersServiceError, models::OrderUuid};
    use salvo::test::TestClient;
    use testresult::TestResult;

    use crate::test_helpers::{AsActor, CUSTOMER, MockApp};

    use super::*;

    fn make_service(app: MockApp) -> Service {
        app.into_service(Router::with_path("orders/{order}").delete(handler))
    }

    #[tokio::test]
    async fn test_cancel_returns_204() -> TestResult {
        let uuid = OrderUuid::new();

        let mut app = MockApp::default();

        app.orders
            .expect_cancel_order()
            .once()
            .withf(move |actor, order| *actor == CUSTOMER && *order == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/orders/{uuid}"))
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NO_CONTENT));

        Ok(())
    }

    #[tokio::test]
    async fn test_settled_order_returns_409() -> TestResult {
        let mut app = MockApp::default();

        app.orders
            .expect_cancel_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotCancellable));

        let res = TestClient::delete(format!("http://example.com/orders/{}", OrderUuid::new()))
            .as_actor(CUSTOMER)
            .send(&make_service(app))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
