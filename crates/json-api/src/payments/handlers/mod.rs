//! Payment Handlers

pub(crate) mod anomalies;
pub(crate) mod create;
pub(crate) mod verify;
