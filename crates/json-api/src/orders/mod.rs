//! Orders

mod errors;
mod handlers;
pub(crate) mod payload;

pub(crate) use handlers::*;
