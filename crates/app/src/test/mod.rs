//! Test support: an isolated `PostgreSQL` database per test and a context
//! wiring the real services over it.


pub(crate) use context::TestContext;
pub(crate) use db::TestDb;
