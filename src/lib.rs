//! Aurum
//!
//! Aurum prices jewellery from metal rates. This crate holds the pure parts: metals and rate
//! tables, item attribute rules, the valuation formula and money conversion. It performs no I/O.

pub mod attributes;
pub mod metals;
pub mod money;
pub mod prelude;
pub mod pricing;
pub mod rates;
pub mod valuation;
