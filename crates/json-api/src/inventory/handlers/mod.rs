//! Inventory Handlers

pub(crate) mod calculate;
pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod update;
