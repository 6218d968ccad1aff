//! The entity table: a typed identity map.
//!
//! One canonical value per (type name, id) pair. Values are stored
//! type-erased behind `Arc<dyn Any>`, keyed by entity name and canonical id;
//! reads downcast back to the concrete type and hand out clones, so callers
//! can never mutate stored state in place. The two-level persistent map
//! keeps clones of the whole table O(1).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use warren_foundation::{EntityId, EntityName};

use crate::entity::{EntityModel, MergeStrategy};

type Stored = Arc<dyn Any + Send + Sync>;

/// The identity map holding every stored entity.
#[derive(Clone, Default)]
pub struct EntityTable {
    tables: im::HashMap<EntityName, im::HashMap<EntityId, Stored>>,
}

impl EntityTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored entities across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.values().map(im::HashMap::len).sum()
    }

    /// True when no entities are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// True when an entity of type `T` is stored under the id.
    #[must_use]
    pub fn contains<T: EntityModel>(&self, id: &T::Id) -> bool {
        self.tables
            .get(&T::entity_name())
            .is_some_and(|table| table.contains_key(&EntityId::of(id)))
    }

    /// Returns a clone of the canonical value stored under the id.
    ///
    /// Returns `None` for unknown ids, and for entries whose stored value is
    /// not actually a `T`, which only happens when two types collide on one
    /// entity name.
    #[must_use]
    pub fn find<T: EntityModel>(&self, id: &T::Id) -> Option<T> {
        self.tables
            .get(&T::entity_name())?
            .get(&EntityId::of(id))
            .and_then(|stored| stored.as_ref().downcast_ref::<T>())
            .cloned()
    }

    /// Looks up many ids, preserving order, with `None` for misses.
    #[must_use]
    pub fn find_all<T: EntityModel>(&self, ids: &[T::Id]) -> Vec<Option<T>> {
        ids.iter().map(|id| self.find::<T>(id)).collect()
    }

    /// Looks up many ids, dropping misses and preserving order.
    #[must_use]
    pub fn find_all_existing<T: EntityModel>(&self, ids: &[T::Id]) -> Vec<T> {
        ids.iter().filter_map(|id| self.find::<T>(id)).collect()
    }

    /// Returns every stored entity of type `T`, in no particular order.
    #[must_use]
    pub fn all<T: EntityModel>(&self) -> Vec<T> {
        self.tables
            .get(&T::entity_name())
            .map(|table| {
                table
                    .values()
                    .filter_map(|stored| stored.as_ref().downcast_ref::<T>())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Stores a normalized copy of the entity.
    ///
    /// A fresh id is inserted as-is; a collision runs the merge strategy on
    /// (stored, incoming) and stores the result.
    pub fn save<T: EntityModel>(&mut self, entity: &T, strategy: &MergeStrategy<T>) {
        let incoming = entity.normalized();
        let name = T::entity_name();
        let id = EntityId::of(&incoming.id());
        let mut table = self.tables.get(&name).cloned().unwrap_or_default();
        let merged = match table
            .get(&id)
            .and_then(|stored| stored.as_ref().downcast_ref::<T>())
        {
            Some(existing) => strategy.apply(existing.clone(), incoming),
            None => incoming,
        };
        table.insert(id, Arc::new(merged) as Stored);
        self.tables.insert(name, table);
    }

    /// Removes and returns the value stored under the id.
    pub fn remove<T: EntityModel>(&mut self, id: &T::Id) -> Option<T> {
        let name = T::entity_name();
        let mut table = self.tables.get(&name).cloned()?;
        let prior = table
            .remove(&EntityId::of(id))
            .and_then(|stored| stored.as_ref().downcast_ref::<T>().cloned());
        if table.is_empty() {
            self.tables.remove(&name);
        } else {
            self.tables.insert(name, table);
        }
        prior
    }
}

impl fmt::Debug for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityTable({} entities)", self.len())
    }
}
