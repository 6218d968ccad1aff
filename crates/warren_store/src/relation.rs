//! Relation field values.
//!
//! Entities reference each other through [`ToOne`] and [`ToMany`] fields
//! holding [`Related`] references. A reference is either faulted (id only)
//! or resolved (full entity payload); normalization collapses everything to
//! faulted before a value reaches the entity table, so the graph can be
//! cyclic even though every stored value is a finite tree.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::context::Context;
use crate::descriptor::LinkMode;
use crate::entity::EntityModel;

/// A reference to a related entity: either just its id, or the entity
/// itself.
///
/// Stored entities only ever hold faulted references; resolved values appear
/// in freshly built payloads before a save and in query results after eager
/// loading. Equality and hashing use the id alone, so a faulted and a
/// resolved reference to the same entity compare equal.
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, T::Id: serde::Serialize",
        deserialize = "T: serde::de::DeserializeOwned, T::Id: serde::de::DeserializeOwned"
    ))
)]
pub enum Related<T: EntityModel> {
    /// An id-only placeholder.
    Faulted(T::Id),
    /// A fully resolved entity, boxed so self-referential types stay sized.
    Resolved(Box<T>),
}

impl<T: EntityModel> Related<T> {
    /// Creates a faulted reference from an id.
    #[must_use]
    pub fn faulted(id: T::Id) -> Self {
        Self::Faulted(id)
    }

    /// Creates a resolved reference from an entity value.
    #[must_use]
    pub fn resolved(entity: T) -> Self {
        Self::Resolved(Box::new(entity))
    }

    /// Returns the referenced entity's id.
    #[must_use]
    pub fn id(&self) -> T::Id {
        match self {
            Self::Faulted(id) => id.clone(),
            Self::Resolved(entity) => entity.id(),
        }
    }

    /// Returns the resolved entity, if any.
    #[must_use]
    pub fn entity(&self) -> Option<&T> {
        match self {
            Self::Faulted(_) => None,
            Self::Resolved(entity) => Some(entity),
        }
    }

    /// Consumes the reference, returning the resolved entity if any.
    #[must_use]
    pub fn into_entity(self) -> Option<T> {
        match self {
            Self::Faulted(_) => None,
            Self::Resolved(entity) => Some(*entity),
        }
    }

    /// True when the reference holds only an id.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }

    /// Collapses the reference to its id.
    pub fn normalize(&mut self) {
        if let Self::Resolved(entity) = self {
            let id = entity.id();
            *self = Self::Faulted(id);
        }
    }

    /// Consuming form of [`Related::normalize`].
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::Faulted(self.id())
    }
}

impl<T: EntityModel> PartialEq for Related<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<T: EntityModel> Eq for Related<T> {}

impl<T: EntityModel> Hash for Related<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<T: EntityModel> fmt::Debug for Related<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Faulted(id) => write!(f, "Faulted({id})"),
            Self::Resolved(entity) => write!(f, "Resolved({})", entity.id()),
        }
    }
}

/// A to-one relation field.
///
/// The field is either detached, making no statement about the link, or
/// holds one reference. Saving a detached field leaves the relationship
/// index untouched; clearing an existing link goes through
/// [`Context::unlink`].
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, T::Id: serde::Serialize",
        deserialize = "T: serde::de::DeserializeOwned, T::Id: serde::de::DeserializeOwned"
    ))
)]
pub struct ToOne<T: EntityModel> {
    target: Option<Related<T>>,
}

impl<T: EntityModel> ToOne<T> {
    /// Creates a detached field.
    #[must_use]
    pub fn none() -> Self {
        Self { target: None }
    }

    /// Creates a field holding a faulted reference.
    #[must_use]
    pub fn faulted(id: T::Id) -> Self {
        Self {
            target: Some(Related::faulted(id)),
        }
    }

    /// Creates a field holding a resolved entity.
    #[must_use]
    pub fn resolved(entity: T) -> Self {
        Self {
            target: Some(Related::resolved(entity)),
        }
    }

    /// Returns the target's id, when the field is attached.
    #[must_use]
    pub fn target_id(&self) -> Option<T::Id> {
        self.target.as_ref().map(Related::id)
    }

    /// Returns the resolved target, if present.
    #[must_use]
    pub fn entity(&self) -> Option<&T> {
        self.target.as_ref().and_then(Related::entity)
    }

    /// Returns the underlying reference, when the field is attached.
    #[must_use]
    pub fn related(&self) -> Option<&Related<T>> {
        self.target.as_ref()
    }

    /// True when the field makes no statement about the link.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.target.is_none()
    }

    /// Collapses a resolved target to its id.
    pub fn normalize(&mut self) {
        if let Some(target) = &mut self.target {
            target.normalize();
        }
    }

    /// Refetches the target's canonical value from a context.
    #[must_use]
    pub fn resolve_in(&self, context: &Context) -> Option<T> {
        self.target_id().and_then(|id| context.find::<T>(&id))
    }

    pub(crate) fn link_ids(&self) -> Option<Vec<T::Id>> {
        self.target.as_ref().map(|target| vec![target.id()])
    }
}

impl<T: EntityModel> Default for ToOne<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: EntityModel> PartialEq for ToOne<T> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl<T: EntityModel> Eq for ToOne<T> {}

impl<T: EntityModel> fmt::Debug for ToOne<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            None => f.write_str("ToOne(detached)"),
            Some(target) => write!(f, "ToOne({target:?})"),
        }
    }
}

/// A to-many relation field.
///
/// The field is either detached, making no statement about the links, or
/// holds an ordered, duplicate-free list of references together with a save
/// mode: a `Replace` payload becomes the full child list on save, an
/// `Append` payload unions into whatever is already linked. An explicitly
/// empty `Replace` payload clears the links.
#[derive(Clone)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, T::Id: serde::Serialize",
        deserialize = "T: serde::de::DeserializeOwned, T::Id: serde::de::DeserializeOwned"
    ))
)]
pub struct ToMany<T: EntityModel> {
    items: Option<Vec<Related<T>>>,
    mode: LinkMode,
}

impl<T: EntityModel> ToMany<T> {
    /// Creates a detached field.
    #[must_use]
    pub fn none() -> Self {
        Self {
            items: None,
            mode: LinkMode::Replace,
        }
    }

    /// Creates a faulted payload that replaces existing links on save.
    #[must_use]
    pub fn faulted(ids: impl IntoIterator<Item = T::Id>) -> Self {
        Self {
            items: Some(Self::dedup(ids.into_iter().map(Related::faulted))),
            mode: LinkMode::Replace,
        }
    }

    /// Creates a resolved payload that replaces existing links on save.
    #[must_use]
    pub fn resolved(entities: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: Some(Self::dedup(entities.into_iter().map(Related::resolved))),
            mode: LinkMode::Replace,
        }
    }

    /// Creates a faulted partial payload that appends to existing links on
    /// save.
    #[must_use]
    pub fn appending(ids: impl IntoIterator<Item = T::Id>) -> Self {
        Self {
            items: Some(Self::dedup(ids.into_iter().map(Related::faulted))),
            mode: LinkMode::Append,
        }
    }

    /// Creates a resolved partial payload that appends to existing links on
    /// save.
    #[must_use]
    pub fn fragment(entities: impl IntoIterator<Item = T>) -> Self {
        Self {
            items: Some(Self::dedup(entities.into_iter().map(Related::resolved))),
            mode: LinkMode::Append,
        }
    }

    // First occurrence of an id wins.
    fn dedup(items: impl Iterator<Item = Related<T>>) -> Vec<Related<T>> {
        let mut deduped: Vec<Related<T>> = Vec::new();
        for item in items {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }
        deduped
    }

    /// Returns the ids of all references, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<T::Id> {
        self.iter().map(Related::id).collect()
    }

    /// Iterates over the references; a detached field iterates nothing.
    pub fn iter(&self) -> impl Iterator<Item = &Related<T>> {
        self.items.iter().flatten()
    }

    /// Iterates over the resolved entities only.
    pub fn entities(&self) -> impl Iterator<Item = &T> {
        self.iter().filter_map(Related::entity)
    }

    /// Number of references; zero when detached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.as_ref().map_or(0, Vec::len)
    }

    /// True when the field holds no references.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the field makes no statement about the links.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.items.is_none()
    }

    /// How a save combines this payload with links already in the index.
    #[must_use]
    pub fn mode(&self) -> LinkMode {
        self.mode
    }

    /// True when an id is among the references.
    #[must_use]
    pub fn contains_id(&self, id: &T::Id) -> bool {
        self.iter().any(|item| &item.id() == id)
    }

    /// Collapses every resolved reference to its id.
    pub fn normalize(&mut self) {
        if let Some(items) = &mut self.items {
            for item in items {
                item.normalize();
            }
        }
    }

    /// Merges references into the field.
    ///
    /// References whose id is already present replace the existing entry in
    /// place, keeping its position; novel ids are appended. A detached field
    /// becomes attached.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = Related<T>>) {
        let items = self.items.get_or_insert_with(Vec::new);
        for item in incoming {
            if let Some(position) = items.iter().position(|member| member == &item) {
                items[position] = item;
            } else {
                items.push(item);
            }
        }
    }

    /// Refetches canonical values for every reference from a context.
    #[must_use]
    pub fn resolve_in(&self, context: &Context) -> Vec<T> {
        context.find_all_existing::<T>(&self.ids())
    }

    pub(crate) fn link_ids(&self) -> Option<Vec<T::Id>> {
        self.items
            .as_ref()
            .map(|items| items.iter().map(Related::id).collect())
    }
}

impl<T: EntityModel> Default for ToMany<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: EntityModel> PartialEq for ToMany<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items && self.mode == other.mode
    }
}

impl<T: EntityModel> Eq for ToMany<T> {}

impl<T: EntityModel> fmt::Debug for ToMany<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.items {
            None => f.write_str("ToMany(detached)"),
            Some(items) => write!(f, "ToMany({items:?}, {:?})", self.mode),
        }
    }
}
