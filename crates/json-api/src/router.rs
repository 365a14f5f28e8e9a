//! App Router

use salvo::Router;

use crate::{healthcheck, identity, inventory, metals, observability, orders, payments};

/// Public health routes plus every domain route behind the identity headers.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(observability::metrics_handler))
        .push(
            Router::new()
                .hoop(identity::handler)
                .push(
                    Router::with_path("metals/prices")
                        .get(metals::index::handler)
                        .push(Router::with_path("{metal}").put(metals::update::handler)),
                )
                .push(
                    Router::with_path("inventory")
                        .get(inventory::index::handler)
                        .post(inventory::create::handler)
                        .push(Router::with_path("calculate").post(inventory::calculate::handler))
                        .push(
                            Router::with_path("{product}")
                                .get(inventory::get::handler)
                                .put(inventory::update::handler),
                        ),
                )
                .push(
                    Router::with_path("orders")
                        .post(orders::create::handler)
                        .push(
                            Router::with_path("{order}")
                                .get(orders::get::handler)
                                .delete(orders::delete::handler)
                                .push(Router::with_path("status").put(orders::status::handler)),
                        ),
                )
                .push(
                    Router::with_path("payments")
                        .post(payments::create::handler)
                        .push(Router::with_path("verify").post(payments::verify::handler))
                        .push(Router::with_path("anomalies").get(payments::anomalies::handler)),
                ),
        )
}
