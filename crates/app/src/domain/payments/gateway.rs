//! Payment Gateway
//!
//! Registers orders with the external gateway so the customer can pay. The
//! gateway answers with its own order id, which later comes back signed.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;
use zeroize::Zeroizing;

use super::errors::GatewayError;

/// Default hard timeout for one gateway call.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Credentials and endpoint for the payment gateway.
#[derive(Clone)]
pub struct PaymentGatewayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: Zeroizing<String>,

    /// ISO 4217 code every order is charged in.
    pub currency: String,

    pub timeout: Duration,
}

impl std::fmt::Debug for PaymentGatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentGatewayConfig")
            .field("base_url", &self.base_url)
            .field("key_id", &self.key_id)
            .field("currency", &self.currency)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// An order registered with the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
struct CreateGatewayOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register an order for `amount` minor units.
    async fn create_order(
        &self,
        amount: i64,
        currency: String,
        receipt: String,
    ) -> Result<GatewayOrder, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    config: PaymentGatewayConfig,
}

impl HttpPaymentGateway {
    #[must_use]
    pub fn new(config: PaymentGatewayConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: String,
        receipt: String,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'));

        debug!(%url, amount, %currency, %receipt, "registering gateway order");

        let request = async {
            let response = self
                .client
                .post(&url)
                .basic_auth(&self.config.key_id, Some(self.config.key_secret.as_str()))
                .json(&CreateGatewayOrder {
                    amount,
                    currency: &currency,
                    receipt: &receipt,
                })
                .send()
                .await
                .map_err(|error| GatewayError::Unavailable(error.to_string()))?;

            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();

                return Err(GatewayError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<GatewayOrder>()
                .await
                .map_err(|error| GatewayError::Malformed(error.to_string()))
        };

        timeout(self.config.timeout, request)
            .await
            .map_err(|_elapsed| GatewayError::Timeout)?
    }
}
