//! Aurum Domain Concerns

pub mod inventory;
pub mod orders;
pub mod payments;
pub mod rates;
