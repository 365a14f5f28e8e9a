//! Payments service.
//!
//! [`PaymentVerifier`] registers online orders with the gateway and confirms
//! the signed callback. A confirmed payment captures, marks the order paid and
//! commits its stock in one step.

use std::sync::Arc;

use async_trait::async_trait;
use aurum::money::{currency, to_minor_units};
use mockall::automock;
use rusty_money::iso;
use tracing::{error, info, warn};

use crate::{
    access::{Actor, Capability},
    domain::{
        orders::{
            models::{Order, OrderStatus, OrderUuid, PaymentMethod},
            repository::OrdersRepository,
        },
        payments::{
            errors::PaymentsServiceError,
            gateway::{PaymentGateway, PaymentGatewayConfig},
            models::{
                CaptureOutcome, NewPayment, PaymentIntent, PaymentUuid, StockAnomaly, Verification,
                VerifyPayment,
            },
            repository::PaymentsRepository,
            signature::SigningKey,
        },
    },
};

/// A gateway client with the key its callbacks are signed with.
#[derive(Clone)]
struct ConfiguredGateway {
    client: Arc<dyn PaymentGateway>,
    key: SigningKey,
    key_id: String,
    currency: &'static iso::Currency,
    currency_code: String,
}

#[derive(Clone)]
pub struct PaymentVerifier {
    payments: Arc<dyn PaymentsRepository>,
    orders: Arc<dyn OrdersRepository>,
    gateway: Option<ConfiguredGateway>,
}

impl std::fmt::Debug for PaymentVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentVerifier")
            .field("configured", &self.gateway.is_some())
            .finish_non_exhaustive()
    }
}

impl PaymentVerifier {
    /// A verifier with no gateway; every payment operation reports
    /// [`PaymentsServiceError::NotConfigured`].
    #[must_use]
    pub fn unconfigured(
        payments: Arc<dyn PaymentsRepository>,
        orders: Arc<dyn OrdersRepository>,
    ) -> Self {
        Self {
            payments,
            orders,
            gateway: None,
        }
    }

    /// A verifier bound to a gateway.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured currency is not an ISO code.
    pub fn new(
        payments: Arc<dyn PaymentsRepository>,
        orders: Arc<dyn OrdersRepository>,
        client: Arc<dyn PaymentGateway>,
        config: &PaymentGatewayConfig,
    ) -> Result<Self, aurum::money::CurrencyError> {
        Ok(Self {
            payments,
            orders,
            gateway: Some(ConfiguredGateway {
                client,
                key: SigningKey::new(config.key_secret.as_bytes()),
                key_id: config.key_id.clone(),
                currency: currency(&config.currency)?,
                currency_code: config.currency.trim().to_ascii_uppercase(),
            }),
        })
    }

    fn gateway(&self) -> Result<&ConfiguredGateway, PaymentsServiceError> {
        self.gateway.as_ref().ok_or(PaymentsServiceError::NotConfigured)
    }

    async fn owned_order(&self, actor: Actor, order: OrderUuid) -> Result<Order, PaymentsServiceError> {
        let order = self.orders.get_order(order).await?;

        if order.user != actor.user && !actor.role.allows(Capability::ManageOrders) {
            return Err(PaymentsServiceError::NotFound);
        }

        Ok(order)
    }
}

#[async_trait]
impl PaymentsService for PaymentVerifier {
    async fn create_payment(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError> {
        let gateway = self.gateway()?;
        let order = self.owned_order(actor, order).await?;

        if order.payment_method != PaymentMethod::Online
            || order.status != OrderStatus::Pending
            || !order.payment_status.is_unsettled()
        {
            return Err(PaymentsServiceError::NotPayable);
        }

        let amount_minor = to_minor_units(order.total, gateway.currency);

        let registered = gateway
            .client
            .create_order(
                amount_minor,
                gateway.currency_code.clone(),
                order.uuid.to_string(),
            )
            .await?;

        let payment = self
            .payments
            .insert_payment(NewPayment {
                uuid: PaymentUuid::new(),
                order: order.uuid,
                external_order_id: registered.id,
                amount: order.total,
                currency: gateway.currency_code.clone(),
            })
            .await?;

        info!(
            order = %order.uuid,
            payment = %payment.uuid,
            external_order_id = %payment.external_order_id,
            amount_minor,
            "payment created"
        );

        Ok(PaymentIntent {
            payment,
            key_id: gateway.key_id.clone(),
            amount_minor,
        })
    }

    async fn verify(
        &self,
        actor: Actor,
        request: VerifyPayment,
    ) -> Result<Verification, PaymentsServiceError> {
        let gateway = self.gateway()?;
        self.owned_order(actor, request.order).await?;

        let payment = self
            .payments
            .find_by_external_order(request.external_order_id.clone())
            .await?
            .ok_or(PaymentsServiceError::NotFound)?;

        if payment.order != request.order {
            warn!(
                order = %request.order,
                external_order_id = %request.external_order_id,
                "payment belongs to a different order"
            );

            return Ok(Verification::Invalid);
        }

        if !gateway.key.verify(
            &request.external_order_id,
            &request.external_payment_id,
            &request.signature,
        ) {
            let marked = self
                .payments
                .mark_failed(payment.uuid, request.external_payment_id, request.signature)
                .await?;

            warn!(
                order = %request.order,
                payment = %payment.uuid,
                marked_failed = marked > 0,
                "payment signature mismatch"
            );

            return Ok(Verification::Invalid);
        }

        match self
            .payments
            .capture(payment.uuid, request.external_payment_id, request.signature)
            .await?
        {
            CaptureOutcome::Captured { order, anomalies } => {
                for anomaly in &anomalies {
                    error!(
                        order = %anomaly.order,
                        payment = %anomaly.payment,
                        product = %anomaly.product,
                        reason = %anomaly.reason,
                        requested = anomaly.requested,
                        available = anomaly.available,
                        "paid order line could not be committed; queued for reconciliation"
                    );
                }

                info!(order = %order.uuid, payment = %payment.uuid, "payment captured");

                Ok(Verification::Verified {
                    order,
                    already_captured: false,
                    anomalies,
                })
            }
            CaptureOutcome::AlreadyCaptured { order } => {
                info!(order = %order.uuid, payment = %payment.uuid, "payment already captured");

                Ok(Verification::Verified {
                    order,
                    already_captured: true,
                    anomalies: Vec::new(),
                })
            }
        }
    }

    async fn list_anomalies(&self, actor: Actor) -> Result<Vec<StockAnomaly>, PaymentsServiceError> {
        actor.require(Capability::ReviewAnomalies)?;

        Ok(self.payments.list_anomalies().await?)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Register an online order with the gateway.
    async fn create_payment(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<PaymentIntent, PaymentsServiceError>;

    /// Check a signed gateway callback and, when it matches, capture.
    async fn verify(
        &self,
        actor: Actor,
        request: VerifyPayment,
    ) -> Result<Verification, PaymentsServiceError>;

    /// Paid lines whose stock was not committed, with the reason.
    async fn list_anomalies(&self, actor: Actor) -> Result<Vec<StockAnomaly>, PaymentsServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{
        domain::{
            inventory::models::ProductUuid,
            orders::{
                OrdersService, OrdersServiceError,
                models::{NewOrder, OrderRequestLine, PaymentStatus},
            },
            payments::models::{AnomalyReason, CaptureStatus},
        },
        test::TestContext,
    };

    use super::*;

    fn order_of(product: ProductUuid, quantity: u64, payment_method: PaymentMethod) -> NewOrder {
        NewOrder {
            lines: vec![OrderRequestLine { product, quantity }],
            quoted_total: None,
            address: "4 Commercial Street, Bengaluru".to_string(),
            payment_method,
        }
    }

    /// Places an online order and registers it with the gateway.
    async fn pending_payment(
        ctx: &TestContext,
        customer: Actor,
        product: ProductUuid,
        quantity: u64,
    ) -> Result<(Order, PaymentIntent), Box<dyn std::error::Error + Send + Sync>> {
        let order = ctx
            .orders
            .place_order(customer, order_of(product, quantity, PaymentMethod::Online))
            .await?;
        let intent = ctx.payments.create_payment(customer, order.uuid).await?;

        Ok((order, intent))
    }

    fn callback(ctx: &TestContext, order: &Order, intent: &PaymentIntent, payment_id: &str) -> VerifyPayment {
        let external_order_id = intent.payment.external_order_id.clone();

        VerifyPayment {
            order: order.uuid,
            signature: ctx.sign(&external_order_id, payment_id),
            external_order_id,
            external_payment_id: payment_id.to_string(),
        }
    }

    #[tokio::test]
    async fn create_payment_charges_order_total_in_minor_units() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;

        let (order, intent) = pending_payment(&ctx, ctx.customer(), product, 1).await?;

        assert_eq!(intent.amount_minor, 1_093_568);
        assert_eq!(intent.key_id, "key_test");
        assert_eq!(intent.payment.amount, dec!(10935.68));
        assert_eq!(intent.payment.currency, "INR");
        assert_eq!(intent.payment.status, CaptureStatus::Created);
        assert!(
            intent
                .payment
                .external_order_id
                .starts_with(&format!("order_{}", order.uuid)),
            "{}",
            intent.payment.external_order_id
        );

        Ok(())
    }

    #[tokio::test]
    async fn cod_orders_are_not_payable_online() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let order = ctx
            .orders
            .place_order(customer, order_of(product, 1, PaymentMethod::Cod))
            .await?;
        let result = ctx.payments.create_payment(customer, order.uuid).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotPayable)),
            "expected NotPayable, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unconfigured_gateway_is_reported() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let order = ctx
            .orders
            .place_order(customer, order_of(product, 1, PaymentMethod::Online))
            .await?;

        let verifier = PaymentVerifier::unconfigured(
            ctx.payments_repository.clone(),
            ctx.orders_repository.clone(),
        );
        let result = verifier.create_payment(customer, order.uuid).await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotConfigured)),
            "expected NotConfigured, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn forged_signature_fails_payment_and_keeps_stock() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;

        let mut request = callback(&ctx, &order, &intent, "pay_forged");
        request.signature = "00".repeat(32);

        let verification = ctx.payments.verify(customer, request).await?;

        assert_eq!(verification, Verification::Invalid);
        assert_eq!(ctx.stock_of(product).await?, 1);

        let order = ctx.orders.get_order(customer, order.uuid).await?;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);

        let payment = ctx.payment(intent.payment.uuid).await?;
        assert_eq!(payment.status, CaptureStatus::Failed);

        Ok(())
    }

    #[tokio::test]
    async fn valid_signature_captures_and_commits_stock() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(2).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 2).await?;

        let verification = ctx
            .payments
            .verify(customer, callback(&ctx, &order, &intent, "pay_1"))
            .await?;

        let Verification::Verified {
            order,
            already_captured,
            anomalies,
        } = verification
        else {
            return Err(format!("expected Verified, got {verification:?}").into());
        };

        assert!(!already_captured);
        assert!(anomalies.is_empty(), "{anomalies:?}");
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.transaction_id.as_deref(), Some("pay_1"));
        assert!(order.stock_committed_at.is_some());
        assert!(!order.needs_reconciliation);
        assert_eq!(ctx.stock_of(product).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_callback_is_idempotent() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(3).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;
        let request = callback(&ctx, &order, &intent, "pay_1");

        ctx.payments.verify(customer, request.clone()).await?;
        let repeated = ctx.payments.verify(customer, request).await?;

        assert!(
            matches!(
                repeated,
                Verification::Verified {
                    already_captured: true,
                    ..
                }
            ),
            "expected already captured, got {repeated:?}"
        );
        assert_eq!(ctx.stock_of(product).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn forged_callback_after_capture_changes_nothing() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;

        ctx.payments
            .verify(customer, callback(&ctx, &order, &intent, "pay_1"))
            .await?;

        let mut forged = callback(&ctx, &order, &intent, "pay_2");
        forged.signature = "deadbeef".to_string();

        assert_eq!(ctx.payments.verify(customer, forged).await?, Verification::Invalid);

        let payment = ctx.payment(intent.payment.uuid).await?;
        assert_eq!(payment.status, CaptureStatus::Captured);
        assert_eq!(payment.external_payment_id.as_deref(), Some("pay_1"));

        let order = ctx.orders.get_order(customer, order.uuid).await?;
        assert_eq!(order.payment_status, PaymentStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn callback_for_another_order_is_invalid() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(2).await?;
        let customer = ctx.customer();

        let (first, intent) = pending_payment(&ctx, customer, product, 1).await?;
        let (second, _) = pending_payment(&ctx, customer, product, 1).await?;

        let mut request = callback(&ctx, &first, &intent, "pay_1");
        request.order = second.uuid;

        assert_eq!(ctx.payments.verify(customer, request).await?, Verification::Invalid);
        assert_eq!(ctx.stock_of(product).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn strangers_cannot_verify_someone_elses_order() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;

        let (order, intent) = pending_payment(&ctx, ctx.customer(), product, 1).await?;

        let result = ctx
            .payments
            .verify(ctx.customer(), callback(&ctx, &order, &intent, "pay_1"))
            .await;

        assert!(
            matches!(result, Err(PaymentsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn capture_without_stock_queues_anomaly() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let admin = ctx.admin();

        let early = ctx.customer();
        let late = ctx.customer();

        let (early_order, early_intent) = pending_payment(&ctx, early, product, 1).await?;
        let (late_order, late_intent) = pending_payment(&ctx, late, product, 1).await?;

        ctx.payments
            .verify(early, callback(&ctx, &early_order, &early_intent, "pay_early"))
            .await?;

        let verification = ctx
            .payments
            .verify(late, callback(&ctx, &late_order, &late_intent, "pay_late"))
            .await?;

        let Verification::Verified { order, anomalies, .. } = verification else {
            return Err(format!("expected Verified, got {verification:?}").into());
        };

        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.needs_reconciliation);
        assert_eq!(ctx.stock_of(product).await?, 0);

        let [anomaly] = anomalies.as_slice() else {
            return Err(format!("expected one anomaly, got {anomalies:?}").into());
        };
        assert_eq!(anomaly.reason, AnomalyReason::Shortage);
        assert_eq!(anomaly.payment, late_intent.payment.uuid);
        assert_eq!((anomaly.requested, anomaly.available), (1, 0));

        let queued = ctx.payments.list_anomalies(admin).await?;
        assert_eq!(queued, anomalies);

        let denied = ctx.payments.list_anomalies(late).await;
        assert!(
            matches!(denied, Err(PaymentsServiceError::AccessDenied(_))),
            "expected AccessDenied, got {denied:?}"
        );

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_cod_checkouts_never_oversell() -> TestResult {
        let ctx = Arc::new(TestContext::new().await?);
        let product = ctx.stock_item(3).await?;

        let mut checkouts = JoinSet::new();

        for _ in 0..12 {
            let ctx = Arc::clone(&ctx);

            checkouts.spawn(async move {
                ctx.orders
                    .place_order(ctx.customer(), order_of(product, 1, PaymentMethod::Cod))
                    .await
            });
        }

        let mut placed = 0;
        let mut rejected = 0;

        while let Some(joined) = checkouts.join_next().await {
            match joined? {
                Ok(_) => placed += 1,
                Err(OrdersServiceError::InsufficientStock(_)) => rejected += 1,
                Err(error) => return Err(format!("unexpected error: {error:?}").into()),
            }
        }

        assert_eq!(placed, 3);
        assert_eq!(rejected, 9);
        assert_eq!(ctx.stock_of(product).await?, 0);

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_captures_commit_at_most_available_stock() -> TestResult {
        let ctx = Arc::new(TestContext::new().await?);
        let product = ctx.stock_item(2).await?;

        let mut callbacks = Vec::new();

        for index in 0..6 {
            let customer = ctx.customer();
            let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;
            callbacks.push((customer, callback(&ctx, &order, &intent, &format!("pay_{index}"))));
        }

        let mut captures = JoinSet::new();

        for (customer, request) in callbacks {
            let ctx = Arc::clone(&ctx);

            captures.spawn(async move { ctx.payments.verify(customer, request).await });
        }

        let mut anomalies = 0;

        while let Some(joined) = captures.join_next().await {
            let verification = joined??;

            let Verification::Verified { anomalies: queued, .. } = verification else {
                return Err(format!("expected Verified, got {verification:?}").into());
            };

            anomalies += queued.len();
        }

        assert_eq!(anomalies, 4);
        assert_eq!(ctx.stock_of(product).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn payment_after_staff_cancel_is_queued_not_committed() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;

        ctx.orders
            .advance_status(ctx.admin(), order.uuid, OrderStatus::Cancelled)
            .await?;

        let verification = ctx
            .payments
            .verify(customer, callback(&ctx, &order, &intent, "pay_late"))
            .await?;

        let Verification::Verified {
            order: settled,
            already_captured,
            anomalies,
        } = verification
        else {
            return Err(format!("expected Verified, got {verification:?}").into());
        };

        assert!(!already_captured);
        assert_eq!(settled.status, OrderStatus::Cancelled);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.transaction_id.as_deref(), Some("pay_late"));
        assert!(settled.stock_committed_at.is_none());
        assert!(settled.needs_reconciliation);
        assert_eq!(ctx.stock_of(product).await?, 1);

        let [anomaly] = anomalies.as_slice() else {
            return Err(format!("expected one anomaly, got {anomalies:?}").into());
        };
        assert_eq!(anomaly.reason, AnomalyReason::OrderClosed);
        assert_eq!((anomaly.requested, anomaly.available), (1, 1));

        let payment = ctx.payment(intent.payment.uuid).await?;
        assert_eq!(payment.status, CaptureStatus::Captured);

        Ok(())
    }

    #[tokio::test]
    async fn second_payment_for_paid_order_is_queued_as_duplicate() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(3).await?;
        let customer = ctx.customer();

        let (order, first) = pending_payment(&ctx, customer, product, 1).await?;
        let second = ctx.payments.create_payment(customer, order.uuid).await?;

        ctx.payments
            .verify(customer, callback(&ctx, &order, &first, "pay_first"))
            .await?;

        let verification = ctx
            .payments
            .verify(customer, callback(&ctx, &order, &second, "pay_second"))
            .await?;

        let Verification::Verified {
            order: settled,
            anomalies,
            ..
        } = verification
        else {
            return Err(format!("expected Verified, got {verification:?}").into());
        };

        assert_eq!(settled.status, OrderStatus::Confirmed);
        assert_eq!(settled.transaction_id.as_deref(), Some("pay_first"));
        assert!(settled.needs_reconciliation);
        assert_eq!(ctx.stock_of(product).await?, 2);

        let [anomaly] = anomalies.as_slice() else {
            return Err(format!("expected one anomaly, got {anomalies:?}").into());
        };
        assert_eq!(anomaly.reason, AnomalyReason::DuplicatePayment);
        assert_eq!(anomaly.payment, second.payment.uuid);

        let duplicate = ctx.payment(second.payment.uuid).await?;
        assert_eq!(duplicate.status, CaptureStatus::Duplicate);

        let repeated = ctx
            .payments
            .verify(customer, callback(&ctx, &order, &second, "pay_second"))
            .await?;
        assert!(
            matches!(repeated, Verification::Verified { already_captured: true, .. }),
            "expected already captured, got {repeated:?}"
        );
        assert_eq!(ctx.payments.list_anomalies(ctx.admin()).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn customer_delete_and_capture_do_not_both_succeed() -> TestResult {
        let ctx = TestContext::new().await?;
        let product = ctx.stock_item(1).await?;
        let customer = ctx.customer();

        let (order, intent) = pending_payment(&ctx, customer, product, 1).await?;

        ctx.payments
            .verify(customer, callback(&ctx, &order, &intent, "pay_1"))
            .await?;

        let cancel = ctx.orders.cancel_order(customer, order.uuid).await;

        assert!(
            matches!(cancel, Err(OrdersServiceError::NotCancellable)),
            "expected NotCancellable, got {cancel:?}"
        );
        assert_eq!(ctx.stock_of(product).await?, 0);

        Ok(())
    }
}
