//! Inventory Models

use aurum::{attributes::ItemAttributes, valuation::Valuation};
use jiff::Timestamp;

use crate::{access::UserUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<InventoryItem>;

/// A stocked piece of jewellery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub uuid: ProductUuid,
    pub name: String,
    pub extra_description: Option<String>,
    pub attributes: ItemAttributes,
    pub stock: u64,

    /// The user who listed the item; sellers may only edit their own.
    pub created_by: UserUuid,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New Inventory Item Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryItem {
    pub uuid: ProductUuid,
    pub name: String,
    pub extra_description: Option<String>,
    pub attributes: ItemAttributes,
    pub stock: u64,
}

/// Inventory Item Update Model; replaces every editable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItemUpdate {
    pub name: String,
    pub extra_description: Option<String>,
    pub attributes: ItemAttributes,
    pub stock: u64,
}

/// An item with its price at the current rates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItem {
    pub item: InventoryItem,
    pub valuation: Valuation,
}
