//! Query layer for Warren.
//!
//! This crate reads the normalized graph back out as nested values:
//!
//! - [`Query`]: a lazy resolver for one entity in one context snapshot,
//!   composed from relation combinators
//! - [`QueryContext`]: query-construction sugar on `Context`
//! - [`resolve_all`]: batch resolution that drops misses

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod query;

pub use query::{Query, QueryContext, resolve_all};
