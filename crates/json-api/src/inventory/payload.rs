//! Inventory payloads shared by the item handlers.

use aurum::{
    attributes::{AttributeError, ItemAttributes, ItemType},
    metals::{Metal, UnknownMetal},
    pricing::PriceBreakdown,
    rates::RateOrigin,
    valuation::AppliedRate,
};
use aurum_app::domain::inventory::models::PricedItem;
use rust_decimal::Decimal;
use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Item Attributes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttributesPayload {
    /// `gold`, `silver`, `platinum` or `palladium`
    pub metal: String,

    pub hallmarked: bool,

    /// Percent of pure metal, e.g. 91.6 for 22 karat
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub purity: Decimal,

    /// Grams of metal
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub net_weight: Decimal,

    /// Grams of stones and other additions
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub extra_weight: Decimal,

    /// Value of stones and other additions
    #[serde(default, serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub extra_value: Decimal,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub gross_weight: Decimal,

    /// `Normal`, `Antique` or `HyperArtistic`
    #[serde(default = "default_item_type")]
    pub item_type: String,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub wastage_percent: Decimal,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    #[salvo(schema(value_type = f64))]
    pub making_charge_per_gram: Decimal,

    /// Per-gram price used when the rate table has no entry for the metal
    #[serde(default, serialize_with = "rust_decimal::serde::float_option::serialize")]
    #[salvo(schema(value_type = Option<f64>))]
    pub stored_metal_price: Option<Decimal>,
}

fn default_item_type() -> String {
    ItemType::Normal.as_str().to_string()
}

impl TryFrom<AttributesPayload> for ItemAttributes {
    type Error = StatusError;

    fn try_from(payload: AttributesPayload) -> Result<Self, Self::Error> {
        let metal: Metal = payload
            .metal
            .parse()
            .map_err(|e: UnknownMetal| StatusError::bad_request().brief(e.to_string()))?;

        let item_type: ItemType = payload
            .item_type
            .parse()
            .map_err(|e: AttributeError| StatusError::bad_request().brief(e.to_string()))?;

        Ok(Self {
            metal,
            hallmarked: payload.hallmarked,
            purity: payload.purity,
            net_weight: payload.net_weight,
            extra_weight: payload.extra_weight,
            extra_value: payload.extra_value,
            gross_weight: payload.gross_weight,
            item_type,
            wastage_percent: payload.wastage_percent,
            making_charge_per_gram: payload.making_charge_per_gram,
            stored_metal_price: payload.stored_metal_price,
        })
    }
}

/// Price Breakdown
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BreakdownResponse {
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub metal_value: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub wastage_amount: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total_making_charge: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub extra_value: Decimal,

    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub total_price: Decimal,
}

impl From<PriceBreakdown> for BreakdownResponse {
    fn from(breakdown: PriceBreakdown) -> Self {
        Self {
            metal_value: breakdown.metal_value,
            wastage_amount: breakdown.wastage_amount,
            total_making_charge: breakdown.making_charge,
            extra_value: breakdown.extra_value,
            total_price: breakdown.total_price,
        }
    }
}

/// Inventory Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemResponse {
    pub uuid: Uuid,
    pub name: String,
    pub extra_description: Option<String>,
    pub attributes: AttributesPayload,
    pub stock: u64,

    /// Per-gram rate the price was computed at
    #[serde(with = "rust_decimal::serde::float")]
    #[salvo(schema(value_type = f64))]
    pub rate: Decimal,

    /// `live`, `stored`, `item` or `unpriced`
    pub rate_source: String,

    pub price: BreakdownResponse,
}

pub(crate) const fn rate_source(applied: AppliedRate) -> &'static str {
    match applied {
        AppliedRate::Table(RateOrigin::Live) => "live",
        AppliedRate::Table(RateOrigin::Stored) => "stored",
        AppliedRate::ItemStored => "item",
        AppliedRate::Unpriced => "unpriced",
    }
}

impl From<PricedItem> for ItemResponse {
    fn from(priced: PricedItem) -> Self {
        let PricedItem { item, valuation } = priced;
        let attributes = item.attributes;

        Self {
            uuid: item.uuid.into(),
            name: item.name,
            extra_description: item.extra_description,
            attributes: AttributesPayload {
                metal: attributes.metal.as_str().to_string(),
                hallmarked: attributes.hallmarked,
                purity: attributes.purity,
                net_weight: attributes.net_weight,
                extra_weight: attributes.extra_weight,
                extra_value: attributes.extra_value,
                gross_weight: attributes.gross_weight,
                item_type: attributes.item_type.as_str().to_string(),
                wastage_percent: attributes.wastage_percent,
                making_charge_per_gram: attributes.making_charge_per_gram,
                stored_metal_price: attributes.stored_metal_price,
            },
            stock: item.stock,
            rate: valuation.rate,
            rate_source: rate_source(valuation.applied).to_string(),
            price: valuation.breakdown.rounded().into(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use aurum::{rates::RateTable, valuation::price_for};
    use aurum_app::{
        access::UserUuid,
        domain::inventory::models::{InventoryItem, ProductUuid},
    };
    use jiff::Timestamp;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    use super::*;

    /// 22 karat, 10 g, 8% wastage, 500 per gram making charge.
    pub(crate) fn bangle_attributes() -> ItemAttributes {
        ItemAttributes {
            metal: Metal::Gold,
            hallmarked: true,
            purity: dec!(91.6),
            net_weight: dec!(10),
            extra_weight: dec!(0),
            extra_value: dec!(0),
            gross_weight: dec!(10),
            item_type: ItemType::Normal,
            wastage_percent: dec!(8),
            making_charge_per_gram: dec!(500),
            stored_metal_price: None,
        }
    }

    pub(crate) fn bangle_json() -> Value {
        json!({
            "metal": "gold",
            "hallmarked": true,
            "purity": 91.6,
            "netWeight": 10,
            "grossWeight": 10,
            "wastagePercent": 8,
            "makingChargePerGram": 500,
        })
    }

    pub(crate) fn priced_bangle(
        uuid: ProductUuid,
        stock: u64,
        rates: &RateTable,
    ) -> Result<PricedItem, AttributeError> {
        let attributes = bangle_attributes();

        Ok(PricedItem {
            valuation: price_for(&attributes, rates)?,
            item: InventoryItem {
                uuid,
                name: "Plain bangle".to_string(),
                extra_description: None,
                attributes,
                stock,
                created_by: UserUuid::new(),
                created_at: Timestamp::UNIX_EPOCH,
                updated_at: Timestamp::UNIX_EPOCH,
            },
        })
    }
}
