//! Foundation types for Warren.
//!
//! This crate provides the identifier and collection primitives the rest of
//! the workspace is built on:
//!
//! - [`EntityId`]: canonical string form of a typed entity id
//! - [`EntityName`], [`RelationName`]: stable names keying the store
//! - [`EntityKey`]: fully qualified entity coordinates
//! - [`IdSet`]: insertion-ordered, duplicate-free id set with structural
//!   sharing
//! - [`Error`], [`ErrorKind`], [`Result`]: the store's error surface

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod id;
mod ordset;

pub use error::{Error, ErrorKind, Result};
pub use id::{EntityId, EntityKey, EntityName, RelationName};
pub use ordset::IdSet;
