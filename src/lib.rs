//! Warren - Normalized in-process object-graph store
//!
//! This crate re-exports all layers of the Warren system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: warren_query      — Lazy, composable graph queries
//! Layer 1: warren_store      — Identity map, relation index, context snapshots
//! Layer 0: warren_foundation — Core types (EntityId, IdSet, Error)
//! ```

pub use warren_foundation as foundation;
pub use warren_query as query;
pub use warren_store as store;
