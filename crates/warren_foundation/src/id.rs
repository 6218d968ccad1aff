//! Entity and relation identifiers.
//!
//! Every entity type carries its own strongly typed id; the store and the
//! relationship index key everything by the id's canonical string form so
//! that heterogeneous types can share one table.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Canonical string form of an entity id.
///
/// Entity types use whatever id type suits them (strings, integers, UUIDs);
/// the storage layer keys entries by this rendered form. Cloning is O(1).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct EntityId(Arc<str>);

impl EntityId {
    /// Creates an id from its raw string form.
    #[must_use]
    pub fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    /// Renders a typed id into its canonical form.
    #[must_use]
    pub fn of(id: &impl fmt::Display) -> Self {
        Self(id.to_string().into())
    }

    /// Returns the raw string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the id back into a typed form.
    ///
    /// Returns `None` when the raw form is not valid for the target type;
    /// callers treat such ids as soft faults and skip them.
    #[must_use]
    pub fn decode<I: FromStr>(&self) -> Option<I> {
        self.0.parse().ok()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self(raw.into())
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Self(raw.into())
    }
}

/// Stable name of an entity type.
///
/// Used as the outer key of the entity table and as the type component of
/// relationship-index keys. Names are compile-time constants declared by
/// each entity type and must stay stable if any persistence is layered on
/// top by a collaborator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityName(&'static str);

impl EntityName {
    /// Creates an entity-type name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityName({})", self.0)
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable name of a relation field.
///
/// The relationship index keys link entries by (entity name, relation name,
/// entity id); this is the middle component.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelationName(&'static str);

impl RelationName {
    /// Creates a relation-field name.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationName({})", self.0)
    }
}

impl fmt::Display for RelationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully qualified coordinates of one entity: type name plus canonical id.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// The entity's type name.
    pub name: EntityName,
    /// The entity's canonical id.
    pub id: EntityId,
}

impl EntityKey {
    /// Creates a key from a type name and a canonical id.
    #[must_use]
    pub fn new(name: EntityName, id: EntityId) -> Self {
        Self { name, id }
    }
}

impl fmt::Debug for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityKey({}/{})", self.name, self.id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.id)
    }
}
