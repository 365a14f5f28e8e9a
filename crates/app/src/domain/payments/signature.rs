//! Payment signatures
//!
//! The gateway signs `external_order_id|external_payment_id` with HMAC-SHA256
//! under the shared secret and sends the hex digest back with the payment.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Shared secret used to check gateway signatures. Wiped on drop.
#[derive(Clone)]
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

impl SigningKey {
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    fn mac(&self, external_order_id: &str, external_payment_id: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.0).ok()?;

        mac.update(external_order_id.as_bytes());
        mac.update(b"|");
        mac.update(external_payment_id.as_bytes());

        Some(mac)
    }

    /// Hex signature for a payment, as the gateway would produce it.
    #[must_use]
    pub fn sign(&self, external_order_id: &str, external_payment_id: &str) -> String {
        self.mac(external_order_id, external_payment_id)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    /// Checks a hex signature in constant time.
    #[must_use]
    pub fn verify(&self, external_order_id: &str, external_payment_id: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature.trim()) else {
            return false;
        };

        self.mac(external_order_id, external_payment_id)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }
}
