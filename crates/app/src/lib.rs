//! Aurum application services: rate caching, inventory, orders and payments
//! over a `PostgreSQL` store.

pub mod access;
pub mod context;
pub mod database;
pub mod domain;
pub mod uuids;

#[cfg(test)]
mod test;
