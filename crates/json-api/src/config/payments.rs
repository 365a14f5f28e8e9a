//! Payments Config

use std::time::Duration;

use aurum_app::domain::payments::PaymentGatewayConfig;
use clap::Args;
use zeroize::Zeroizing;

use super::ConfigError;

/// Payment gateway settings. Online payments stay disabled until both key
/// settings are present.
#[derive(Debug, Args)]
pub struct PaymentsConfig {
    /// Gateway API base URL
    #[arg(long, env = "GATEWAY_BASE_URL", default_value = "https://api.razorpay.com")]
    pub gateway_base_url: String,

    /// Gateway key id
    #[arg(long, env = "GATEWAY_KEY_ID")]
    pub gateway_key_id: Option<String>,

    /// Gateway key secret, also used to verify payment signatures
    #[arg(long, env = "GATEWAY_KEY_SECRET", hide_env_values = true)]
    pub gateway_key_secret: Option<String>,

    /// ISO 4217 code orders are charged in
    #[arg(long, env = "GATEWAY_CURRENCY", default_value = "INR")]
    pub gateway_currency: String,

    /// Hard timeout for one gateway call, in milliseconds
    #[arg(long, env = "GATEWAY_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub gateway_timeout_ms: u64,
}

impl PaymentsConfig {
    /// Gateway settings, or `None` when the gateway is not configured.
    ///
    /// # Errors
    ///
    /// Returns an error when only one of the key settings is present.
    pub fn gateway_config(&self) -> Result<Option<PaymentGatewayConfig>, ConfigError> {
        let key_id = self.gateway_key_id.as_deref().filter(|v| !v.trim().is_empty());
        let key_secret = self
            .gateway_key_secret
            .as_deref()
            .filter(|v| !v.trim().is_empty());

        match (key_id, key_secret) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::IncompleteGateway("key secret")),
            (None, Some(_)) => Err(ConfigError::IncompleteGateway("key id")),
            (Some(key_id), Some(key_secret)) => Ok(Some(PaymentGatewayConfig {
                base_url: self.gateway_base_url.clone(),
                key_id: key_id.to_string(),
                key_secret: Zeroizing::new(key_secret.to_string()),
                currency: self.gateway_currency.clone(),
                timeout: Duration::from_millis(self.gateway_timeout_ms),
            })),
        }
    }
}
