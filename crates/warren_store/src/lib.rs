//! Storage layer for Warren.
//!
//! This crate holds the normalized object graph:
//!
//! - [`EntityModel`]: the contract stored entity types implement
//! - [`Related`], [`ToOne`], [`ToMany`]: relation field values, faulted or
//!   resolved
//! - [`ToOneField`], [`ToManyField`], [`Inverse`], [`Links`]: relation
//!   descriptors and the link batches they project
//! - [`EntityTable`]: the typed identity map
//! - [`RelationIndex`]: ordered link entries with mutual-inverse upkeep
//! - [`Context`]: the snapshot façade tying the two together
//! - [`MergeStrategy`]: per-type collision handling on save

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod context;
mod descriptor;
mod entity;
mod index;
mod relation;
mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use context::Context;
pub use descriptor::{Cardinality, Inverse, LinkMode, Links, ToManyField, ToOneField};
pub use entity::{EntityModel, MergeStrategy};
pub use index::{Counterpart, InverseLink, RelationIndex};
pub use relation::{Related, ToMany, ToOne};
pub use table::EntityTable;
