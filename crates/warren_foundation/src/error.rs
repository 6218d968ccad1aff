//! Error types for the store.
//!
//! The error surface is deliberately small: reads report misses through
//! `Option`, so errors only arise from explicit expectations and from save
//! and delete hooks that enforce domain rules of their own.

use thiserror::Error;

use crate::id::EntityName;

/// Result type used throughout the store.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised by a store operation.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates an error from a kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an error for an entity that was expected to exist.
    #[must_use]
    pub fn entity_missing(entity: EntityName, id: impl Into<String>) -> Self {
        Self::new(ErrorKind::EntityMissing {
            entity,
            id: id.into(),
        })
    }

    /// Creates an error for a violated domain rule.
    #[must_use]
    pub fn contract(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Contract(message.into()))
    }
}

/// The kinds of errors the store can raise.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// An entity that was expected to exist is not in the store.
    #[error("entity missing: {entity}/{id}")]
    EntityMissing {
        /// Type name of the missing entity.
        entity: EntityName,
        /// Canonical id that was looked up.
        id: String,
    },

    /// A save or delete hook rejected the operation.
    #[error("contract violation: {0}")]
    Contract(String),
}
