//! The entity contract and merge strategies.

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Arc;

use warren_foundation::{EntityId, EntityKey, EntityName, Result};

use crate::context::Context;

/// The contract every stored entity type implements.
///
/// An entity is a plain value with a unique id and zero or more relation
/// fields. The store never holds nested entity payloads: before a value is
/// written, [`normalize`](EntityModel::normalize) collapses every relation
/// field to faulted id references, and the links themselves live in the
/// relationship index.
pub trait EntityModel: Clone + Send + Sync + 'static {
    /// The typed id, convertible to and from its canonical string form.
    type Id: Clone + Eq + Hash + fmt::Display + FromStr + Send + Sync + 'static;

    /// Stable type name keying the entity table and the relationship index.
    fn entity_name() -> EntityName;

    /// Returns the entity's id.
    fn id(&self) -> Self::Id;

    /// Collapses every relation field to faulted references.
    fn normalize(&mut self);

    /// Strategy applied when a save collides with an already-stored value.
    ///
    /// The default replaces the stored value wholesale.
    #[must_use]
    fn merge_strategy() -> MergeStrategy<Self> {
        MergeStrategy::replace()
    }

    /// Writes this entity and its relation links into a draft context.
    ///
    /// Implementations insert the entity itself first, then register each
    /// relation field through its descriptor, so the entity table is always
    /// written before the relationship index.
    ///
    /// # Errors
    /// Returns an error when a domain rule rejects the save.
    fn save(&self, context: &mut Context) -> Result<()>;

    /// Removes the entity with the given id from a draft context.
    ///
    /// The default detaches the entity's links and drops the stored value,
    /// leaving related entities in place. Types that own their children
    /// override this to delete them too.
    ///
    /// # Errors
    /// Returns an error when a domain rule rejects the delete.
    fn delete(context: &mut Context, id: &Self::Id) -> Result<()> {
        context.remove_entity::<Self>(id);
        Ok(())
    }

    /// Returns a normalized copy of the entity.
    #[must_use]
    fn normalized(&self) -> Self {
        let mut copy = self.clone();
        copy.normalize();
        copy
    }

    /// Returns the entity's fully qualified store coordinates.
    #[must_use]
    fn key(&self) -> EntityKey {
        EntityKey::new(Self::entity_name(), EntityId::of(&self.id()))
    }
}

/// How a saved entity combines with the value already stored under its id.
///
/// Strategies are pure functions of (stored, incoming). The default replaces
/// the stored value; types whose saves carry partial payloads supply their
/// own, e.g. keeping established scalar fields or unioning a to-many
/// relation field.
pub struct MergeStrategy<T> {
    combine: Arc<dyn Fn(T, T) -> T + Send + Sync>,
}

impl<T> MergeStrategy<T> {
    /// Creates a strategy from a combining function of (stored, incoming).
    #[must_use]
    pub fn new(combine: impl Fn(T, T) -> T + Send + Sync + 'static) -> Self {
        Self {
            combine: Arc::new(combine),
        }
    }

    /// The default strategy: the incoming value wins.
    #[must_use]
    pub fn replace() -> Self {
        Self::new(|_stored, incoming| incoming)
    }

    /// Applies the strategy to the stored and incoming values.
    #[must_use]
    pub fn apply(&self, stored: T, incoming: T) -> T {
        (self.combine)(stored, incoming)
    }
}

impl<T> Clone for MergeStrategy<T> {
    fn clone(&self) -> Self {
        Self {
            combine: Arc::clone(&self.combine),
        }
    }
}

impl<T> Default for MergeStrategy<T> {
    fn default() -> Self {
        Self::replace()
    }
}

impl<T> fmt::Debug for MergeStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MergeStrategy")
    }
}
