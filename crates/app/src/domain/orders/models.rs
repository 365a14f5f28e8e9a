//! Order Models

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{access::UserUuid, domain::inventory::models::ProductUuid, uuids::TypedUuid};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} \"{value}\"")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

labelled_enum!(
    /// Fulfilment status.
    OrderStatus, "order status", {
        Pending => "pending",
        Confirmed => "confirmed",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
);

labelled_enum!(
    /// Settlement status.
    PaymentStatus, "payment status", {
        Pending => "pending",
        Cod => "cod",
        Paid => "paid",
        Failed => "failed",
    }
);

labelled_enum!(
    /// How the customer settles.
    PaymentMethod, "payment method", {
        Cod => "cod",
        Online => "online",
    }
);

impl OrderStatus {
    /// Whether staff may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Confirmed, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending, Self::Cancelled)
        )
    }
}

impl PaymentStatus {
    /// Whether nothing has been collected, so the order can still be dropped.
    #[must_use]
    pub const fn is_unsettled(self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

/// A priced order line; `unit_price` is frozen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product: ProductUuid,
    pub quantity: u64,
    pub unit_price: Decimal,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub stock_committed_at: Option<Timestamp>,
    pub needs_reconciliation: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A line as requested by the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequestLine {
    pub product: ProductUuid,
    pub quantity: u64,
}

/// New Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub lines: Vec<OrderRequestLine>,

    /// Total the customer was shown, when sent.
    pub quoted_total: Option<Decimal>,

    pub address: String,
    pub payment_method: PaymentMethod,
}

/// A fully priced order ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub uuid: OrderUuid,
    pub user: UserUuid,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
}

/// A line that cannot be covered by current stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockShortage {
    pub product: ProductUuid,
    pub requested: u64,
    pub available: u64,
}

/// Outcome of storing an order together with its stock commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCommit {
    Committed(Order),

    /// Nothing was stored.
    Short(Vec<StockShortage>),
}
