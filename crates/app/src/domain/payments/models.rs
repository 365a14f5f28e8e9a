//! Payment Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        inventory::models::ProductUuid,
        orders::models::{Order, OrderUuid, UnknownVariant},
    },
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<Payment>;

/// Stock Anomaly UUID
pub type StockAnomalyUuid = TypedUuid<StockAnomaly>;

/// Gateway-side state of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Created,
    Captured,
    Failed,

    /// Money taken for an order another payment had already settled.
    Duplicate,
}

impl CaptureStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Captured => "captured",
            Self::Failed => "failed",
            Self::Duplicate => "duplicate",
        }
    }
}

impl CaptureStatus {
    /// Whether a callback for this payment was already settled.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Captured | Self::Duplicate)
    }
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "created" => Ok(Self::Created),
            "captured" => Ok(Self::Captured),
            "failed" => Ok(Self::Failed),
            "duplicate" => Ok(Self::Duplicate),
            _ => Err(UnknownVariant {
                kind: "capture status",
                value: value.to_string(),
            }),
        }
    }
}

/// Payment Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub uuid: PaymentUuid,
    pub order: OrderUuid,
    pub external_order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: CaptureStatus,
    pub external_payment_id: Option<String>,
    pub external_signature: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Payment Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub uuid: PaymentUuid,
    pub order: OrderUuid,
    pub external_order_id: String,
    pub amount: Decimal,
    pub currency: String,
}

/// What a client needs to open the gateway checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub payment: Payment,
    pub key_id: String,
    pub amount_minor: i64,
}

/// Gateway callback data presented for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyPayment {
    pub order: OrderUuid,
    pub external_order_id: String,
    pub external_payment_id: String,
    pub signature: String,
}

/// Why a paid line was queued instead of committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyReason {
    /// Stock ran out before the payment arrived.
    Shortage,

    /// The order was cancelled or otherwise closed before the payment arrived.
    OrderClosed,

    /// Another payment had already settled the order.
    DuplicatePayment,
}

impl AnomalyReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shortage => "shortage",
            Self::OrderClosed => "order_closed",
            Self::DuplicatePayment => "duplicate_payment",
        }
    }
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnomalyReason {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "shortage" => Ok(Self::Shortage),
            "order_closed" => Ok(Self::OrderClosed),
            "duplicate_payment" => Ok(Self::DuplicatePayment),
            _ => Err(UnknownVariant {
                kind: "anomaly reason",
                value: value.to_string(),
            }),
        }
    }
}

/// A paid line whose stock was not committed and needs a person to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAnomaly {
    pub uuid: StockAnomalyUuid,
    pub order: OrderUuid,
    pub payment: PaymentUuid,
    pub product: ProductUuid,
    pub reason: AnomalyReason,
    pub requested: u64,
    pub available: u64,
    pub detected_at: Timestamp,
}

/// Result of the capture transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The payment was recorded. Stock was committed for every line not
    /// listed in `anomalies`.
    Captured {
        order: Order,
        anomalies: Vec<StockAnomaly>,
    },

    /// An earlier verification already captured this payment.
    AlreadyCaptured { order: Order },
}

/// Result of verifying a gateway callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Verified {
        order: Order,
        already_captured: bool,
        anomalies: Vec<StockAnomaly>,
    },

    /// Signature did not match; nothing but the payment row changed.
    Invalid,
}

impl Verification {
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}
